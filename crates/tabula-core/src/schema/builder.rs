use super::{Associativity, Config, Schema};

/// Configures a [`Schema`] before any source is declared.
#[derive(Debug, Default)]
pub struct Builder {
    name: String,
    config: Config,
}

impl Builder {
    pub(super) fn new(name: impl Into<String>) -> Builder {
        Builder {
            name: name.into(),
            config: Config::default(),
        }
    }

    pub fn inner_join_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.config.join_syntax.inner = template.into();
        self
    }

    pub fn left_join_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.config.join_syntax.left = template.into();
        self
    }

    pub fn join_associativity(&mut self, associativity: Associativity) -> &mut Self {
        self.config.join_syntax.associativity = associativity;
        self
    }

    pub fn placeholder_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.config.placeholder_prefix = prefix.into();
        self
    }

    pub fn select_implicitly_for(&mut self, clause: impl Into<String>) -> &mut Self {
        self.config.select_implicitly_for = Some(clause.into());
        self
    }

    pub fn default_page_size(&mut self, page_size: u64) -> &mut Self {
        self.config.default_page_size = page_size;
        self
    }

    pub fn keep_last_cursor(&mut self, keep: bool) -> &mut Self {
        self.config.keep_last_cursor = keep;
        self
    }

    pub fn build(&mut self) -> Schema {
        Schema::with_config(std::mem::take(&mut self.name), self.config.clone())
    }
}

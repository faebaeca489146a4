use super::Value;

/// Primary-key values, in primary-key column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Key(pub Vec<Value>);

impl Key {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Collapses a single-column key to its value; composite keys become a list.
    pub fn into_value(mut self) -> Value {
        if self.0.len() == 1 {
            self.0.remove(0)
        } else {
            Value::List(self.0)
        }
    }
}

macro_rules! impl_key_from_scalar {
    ( $($t:ty),+ ) => {
        $(
            impl From<$t> for Key {
                fn from(src: $t) -> Key {
                    Key(vec![Value::from(src)])
                }
            }
        )+
    };
}

impl_key_from_scalar!(i32, i64, u32, &str, String);

impl From<Value> for Key {
    fn from(src: Value) -> Key {
        match src {
            Value::List(values) => Key(values),
            value => Key(vec![value]),
        }
    }
}

impl From<Vec<Value>> for Key {
    fn from(src: Vec<Value>) -> Key {
        Key(src)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Key {
        Key(vec![a.into(), b.into()])
    }
}

//! Bound parameters.
//!
//! A [`Param`] is either one scalar or a list of scalars. A list binds to a
//! single `?` in its fragment and expands to one placeholder per element,
//! which is how `IN (?)` and `FIELD(col, ?)` style fragments are written.

use chrono::NaiveDateTime;

use crate::value::SqlValue;

/// A parameter attached to a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Consumes one `?` and binds one value.
    Scalar(SqlValue),
    /// Consumes one `?` and binds every element in order.
    List(Vec<SqlValue>),
}

impl Param {
    /// Builds a list parameter from any iterator of scalars.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SqlValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Number of flattened values this parameter contributes.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(values) => values.len(),
        }
    }
}

impl From<SqlValue> for Param {
    fn from(v: SqlValue) -> Self {
        Self::Scalar(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        Self::Scalar(v.into())
    }
}

// Scalars and homogeneous sequences of them. Implemented per concrete type so
// that `Vec<T>` never competes with a scalar conversion.
macro_rules! impl_param {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(v: $t) -> Self {
                    Self::Scalar(v.into())
                }
            }

            impl From<Vec<$t>> for Param {
                fn from(v: Vec<$t>) -> Self {
                    Self::list(v)
                }
            }

            impl From<&[$t]> for Param {
                fn from(v: &[$t]) -> Self {
                    Self::list(v.iter().cloned())
                }
            }

            impl From<&Vec<$t>> for Param {
                fn from(v: &Vec<$t>) -> Self {
                    Self::list(v.iter().cloned())
                }
            }

            impl<const N: usize> From<[$t; N]> for Param {
                fn from(v: [$t; N]) -> Self {
                    Self::list(v)
                }
            }
        )*
    };
}

impl_param!(bool, i8, i16, i32, i64, u16, u32, f32, f64, String, &str, NaiveDateTime);

// A `Vec<u8>` is a blob value rather than a list, so `u8` converts as a scalar only.
impl From<u8> for Param {
    fn from(v: u8) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<Vec<SqlValue>> for Param {
    fn from(v: Vec<SqlValue>) -> Self {
        Self::List(v)
    }
}

/// A set of parameters for one fragment, in placeholder order.
pub trait IntoParams {
    /// Converts into the ordered parameter list.
    fn into_params(self) -> Vec<Param>;
}

impl IntoParams for () {
    fn into_params(self) -> Vec<Param> {
        Vec::new()
    }
}

impl IntoParams for Vec<Param> {
    fn into_params(self) -> Vec<Param> {
        self
    }
}

macro_rules! impl_into_params_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Param>),+> IntoParams for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_params(self) -> Vec<Param> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_params_tuple!(A);
impl_into_params_tuple!(A, B);
impl_into_params_tuple!(A, B, C);
impl_into_params_tuple!(A, B, C, D);
impl_into_params_tuple!(A, B, C, D, E);
impl_into_params_tuple!(A, B, C, D, E, F);
impl_into_params_tuple!(A, B, C, D, E, F, G);
impl_into_params_tuple!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_list_conversions() {
        assert_eq!(Param::from(7_i64), Param::Scalar(SqlValue::Int(7)));
        assert_eq!(
            Param::from(vec![1_i64, 2, 3]),
            Param::List(vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)])
        );
        assert_eq!(
            Param::from(["a", "b"]),
            Param::List(vec![SqlValue::from("a"), SqlValue::from("b")])
        );
        assert_eq!(Param::from(None::<String>), Param::Scalar(SqlValue::Null));
    }

    #[test]
    fn test_every_integer_field_type_binds() {
        assert_eq!(Param::from(200_u8), Param::Scalar(SqlValue::Int(200)));
        assert_eq!(Param::from(7_u16), Param::Scalar(SqlValue::Int(7)));
        assert_eq!(Param::from(u32::MAX), Param::Scalar(SqlValue::Int(i64::from(u32::MAX))));
        assert_eq!(Param::from(-3_i8), Param::Scalar(SqlValue::Int(-3)));
    }

    #[test]
    fn test_tuple_params_keep_order() {
        let params = ("title", 3_i64, vec![1_i64, 2]).into_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Param::Scalar(SqlValue::from("title")));
        assert_eq!(params[1], Param::Scalar(SqlValue::Int(3)));
        assert_eq!(params[2].width(), 2);
    }

    #[test]
    fn test_unit_has_no_params() {
        assert!(().into_params().is_empty());
    }
}

//! Macros to reduce boilerplate in the codebase

/// Macro to generate Display and FromStr implementations for enums
///
/// Parsing is case-insensitive; the error constructor receives the rejected
/// input.
///
/// # Usage
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     TicketColumn,
///     PsaError::invalid_sort_column,
///     {
///         Id => "id",
///         Name => "name",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_ctor:path,
        { $($variant:ident => $str:expr),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::PsaError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($error_ctor(s.to_string())),
                }
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::error::{PsaError, Result};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEnum {
        A,
        Bee,
    }

    // Expands next to the crate's one-parameter `Result` alias.
    enum_display_fromstr!(TestEnum, PsaError::invalid_sort_column, { A => "a", Bee => "bee" });

    fn parse(s: &str) -> Result<TestEnum> {
        s.parse()
    }

    #[test]
    fn test_display() {
        assert_eq!(TestEnum::A.to_string(), "a");
        assert_eq!(TestEnum::Bee.to_string(), "bee");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(parse("BEE").unwrap(), TestEnum::Bee);
        assert!(matches!(
            "c".parse::<TestEnum>(),
            Err(PsaError::InvalidSortColumn(c)) if c == "c"
        ));
    }
}

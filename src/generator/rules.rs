/// Validation rule applied to a generated DTO field
///
/// Derived from a column's declared native type. The mapping is deliberately
/// coarse: it gives the developer a starting point to hand-edit, not an exact
/// translation of every SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// `@IsString()`; also the fallback for unknown types
    String,
    /// `@IsInt()`
    Int,
    /// `@IsEmail()`
    Email,
}

impl ValidationRule {
    /// Map a declared column type to its rule
    ///
    /// Total and deterministic: anything not listed resolves to
    /// [`ValidationRule::String`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use api_scaffold::generator::ValidationRule;
    ///
    /// assert_eq!(ValidationRule::for_data_type("integer"), ValidationRule::Int);
    /// assert_eq!(ValidationRule::for_data_type("jsonb"), ValidationRule::String);
    /// ```
    pub fn for_data_type(data_type: &str) -> Self {
        match data_type {
            "integer" => ValidationRule::Int,
            "text" | "character varying" => ValidationRule::String,
            "email" => ValidationRule::Email,
            _ => ValidationRule::String,
        }
    }

    /// class-validator decorator name
    pub fn decorator(&self) -> &'static str {
        match self {
            ValidationRule::String => "IsString",
            ValidationRule::Int => "IsInt",
            ValidationRule::Email => "IsEmail",
        }
    }

    /// TypeScript type of the DTO property
    pub fn ts_type(&self) -> &'static str {
        match self {
            ValidationRule::Int => "number",
            ValidationRule::String | ValidationRule::Email => "string",
        }
    }

    /// JSON placeholder used in sample request bodies
    pub fn placeholder(&self) -> &'static str {
        match self {
            ValidationRule::String => "\"value\"",
            ValidationRule::Int => "1",
            ValidationRule::Email => "\"user@example.com\"",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(ValidationRule::for_data_type("integer"), ValidationRule::Int);
        assert_eq!(ValidationRule::for_data_type("text"), ValidationRule::String);
        assert_eq!(
            ValidationRule::for_data_type("character varying"),
            ValidationRule::String
        );
        assert_eq!(ValidationRule::for_data_type("email"), ValidationRule::Email);
    }

    #[test]
    fn test_unknown_types_fall_back_to_string() {
        for ty in ["bigint", "timestamp without time zone", "uuid", "", "INTEGER"] {
            assert_eq!(ValidationRule::for_data_type(ty), ValidationRule::String, "{ty}");
        }
    }

    #[test]
    fn test_decorators() {
        assert_eq!(ValidationRule::String.decorator(), "IsString");
        assert_eq!(ValidationRule::Int.decorator(), "IsInt");
        assert_eq!(ValidationRule::Email.decorator(), "IsEmail");
        assert_eq!(ValidationRule::Int.ts_type(), "number");
        assert_eq!(ValidationRule::Email.ts_type(), "string");
    }
}

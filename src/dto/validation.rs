//! Rendering of validation failures for HTTP responses.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Flatten `errors` into `field -> [message]`, using the camelCase field names clients send.
///
/// Errors without a custom message fall back to the validator code (e.g. `range`).
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages = field_errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            (camel_case(&field), messages)
        })
        .collect()
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use validator::ValidationError;

    use super::*;

    #[test]
    fn field_names_are_camel_cased() {
        assert_eq!(camel_case("release_date"), "releaseDate");
        assert_eq!(camel_case("releaseDate"), "releaseDate");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn messages_fall_back_to_codes() {
        let mut errors = ValidationErrors::new();
        let mut with_message = ValidationError::new("range");
        with_message.message = Some("Price must be between 0.01 and 999.99".into());
        errors.add("price", with_message);
        errors.add("release_date", ValidationError::new("required"));

        let rendered = field_messages(&errors);
        assert_eq!(
            rendered["price"],
            vec!["Price must be between 0.01 and 999.99".to_string()]
        );
        assert_eq!(rendered["releaseDate"], vec!["required".to_string()]);
    }
}

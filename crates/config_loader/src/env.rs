//! `$(VAR)` placeholder expansion
//!
//! Every string value of the blueprint may reference environment variables
//! as `$(NAME)`. Unknown variables and unclosed placeholders are parse errors.

use contracts::{ContractError, StationBlueprint};

const OPEN: &str = "$(";
const CLOSE: char = ')';

/// Replace every `$(NAME)` in `input` using `lookup`
pub fn replace_placeholders<F>(input: &str, lookup: F) -> Result<String, ContractError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open.find(CLOSE).ok_or_else(|| {
            ContractError::config_parse(format!("invalid placeholder in configuration: {input}"))
        })?;

        let name = &after_open[..end];
        let value = lookup(name).ok_or_else(|| {
            ContractError::config_parse(format!("environment variable not found: {name}"))
        })?;
        output.push_str(&value);
        rest = &after_open[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn expand(value: &mut String) -> Result<(), ContractError> {
    if value.contains(OPEN) {
        *value = replace_placeholders(value, |name| std::env::var(name).ok())?;
    }
    Ok(())
}

/// Expand placeholders in every string of the blueprint, in place
pub(crate) fn expand_blueprint(blueprint: &mut StationBlueprint) -> Result<(), ContractError> {
    for channel in blueprint.channels.values_mut() {
        expand(&mut channel.name)?;
        expand(&mut channel.address)?;
        for source in &mut channel.sources {
            expand(&mut source.kind)?;
            for value in source.params.values_mut() {
                expand(value)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOST" => Some("10.0.0.7".to_string()),
            "PORT" => Some("6000".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_replaces_multiple_placeholders() {
        let out = replace_placeholders("tcp://$(HOST):$(PORT)", lookup).unwrap();
        assert_eq!(out, "tcp://10.0.0.7:6000");
    }

    #[test]
    fn test_leaves_plain_strings_untouched() {
        let out = replace_placeholders("odbedit -c 'ls /'", lookup).unwrap();
        assert_eq!(out, "odbedit -c 'ls /'");
    }

    #[test]
    fn test_missing_variable_is_parse_error() {
        let err = replace_placeholders("$(NOPE)/x", lookup).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_unclosed_placeholder_is_parse_error() {
        let err = replace_placeholders("tcp://$(HOST", lookup).unwrap_err();
        assert!(err.to_string().contains("invalid placeholder"));
    }
}

/// Expand `${ENV_VAR}` placeholders before the config text is parsed.
///
/// Unset variables and unterminated placeholders are kept verbatim so the
/// parser reports them in context.
pub fn substitute_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(name: &str) -> Option<String> {
        match name {
            "CAH_ADMIN" => Some("1234".into()),
            "CAH_PACK" => Some("office".into()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_vars() {
        assert_eq!(
            expand_with("admins = [${CAH_ADMIN}]\ndefault_pack = \"${CAH_PACK}\"", fake_env),
            "admins = [1234]\ndefault_pack = \"office\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env("${CAHBOT_NONEXISTENT_XYZ}"),
            "${CAHBOT_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn malformed_placeholder_is_literal() {
        assert_eq!(expand_with("x=${CAH_PACK", fake_env), "x=${CAH_PACK");
        assert_eq!(expand_with("x=${}", fake_env), "x=${}");
        assert_eq!(expand_with("lone $ sign", fake_env), "lone $ sign");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}

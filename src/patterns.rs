use crate::config::Operation;
use crate::errors::Result;
use regex::Regex;
use std::borrow::Cow;

/// Attribute stripped from the `MeshHideAsset.asset` field.
pub const SERIALIZE_FIELD: &str = "SerializeField";

/// Field declaration that must follow the stripped attribute.
pub const SLOT_ASSET_FIELD: &str = "public SlotDataAsset asset";

/// Namespace prefix carried by the skin shader helpers.
pub const SSS_PREFIX: &str = "SSS_";

/// Shader helpers in `SSS_Utils.cginc` that collide with the render pipeline's
/// global functions of the same name. Applied in this order.
pub const SSS_IDENTIFIERS: [&str; 5] = [
    "RoughnessToPerceptualRoughness",
    "RoughnessToPerceptualSmoothness",
    "PerceptualSmoothnessToRoughness",
    "PerceptualSmoothnessToPerceptualRoughness",
    "PerceptualRoughnessToPerceptualSmoothness",
];

/// The text produced by applying a rule, plus how many edits it made.
#[derive(Debug)]
pub struct Rewrite<'a> {
    pub text: Cow<'a, str>,
    pub changes: usize,
}

impl Rewrite<'_> {
    /// Returns `true` if the rewritten text differs from `original`.
    pub fn differs_from(&self, original: &str) -> bool {
        matches!(self.text, Cow::Owned(_)) && self.text != original
    }
}

/// Removes a `[Attribute]` line sitting directly above a field declaration.
///
/// Only the first match in a file is rewritten.
pub struct AttributeRule {
    regex: Regex,
}

impl AttributeRule {
    /// Builds the rule for `attribute` (without brackets) guarding `declaration`.
    ///
    /// Declaration tokens may be separated by any whitespace in the source file.
    pub fn new(attribute: &str, declaration: &str) -> Result<Self> {
        let attribute = attribute.trim().trim_start_matches('[').trim_end_matches(']');
        if attribute.is_empty() {
            return Err("strip_attribute: attribute must not be empty".into());
        }
        let tokens: Vec<String> = declaration.split_whitespace().map(regex::escape).collect();
        if tokens.is_empty() {
            return Err("strip_attribute: declaration must not be empty".into());
        }

        // Leading blanks belong to the attribute line and go with it.
        let pattern = format!(
            r"[ \t]*\[{}\]\s*\n(\s*{})",
            regex::escape(attribute),
            tokens.join(r"\s+")
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn apply<'a>(&self, text: &'a str) -> Rewrite<'a> {
        let changes = usize::from(self.regex.is_match(text));
        Rewrite {
            text: self.regex.replacen(text, 1, "${1}"),
            changes,
        }
    }
}

/// Prepends `prefix` to every whole-word occurrence of `identifier` that does
/// not already carry it.
pub struct PrefixRule {
    regex: Regex,
    prefix: String,
    replacement: String,
}

impl PrefixRule {
    pub fn new(prefix: &str, identifier: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err("prefix_identifiers: prefix must not be empty".into());
        }
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err("prefix_identifiers: identifiers must not be empty".into());
        }

        let pattern = format!(r"\b{}\b", regex::escape(identifier));
        Ok(Self {
            regex: Regex::new(&pattern)?,
            prefix: prefix.to_string(),
            replacement: format!("{prefix}{identifier}"),
        })
    }

    pub fn apply<'a>(&self, text: &'a str) -> Rewrite<'a> {
        let mut output = String::new();
        let mut last = 0;
        let mut changes = 0;

        for m in self.regex.find_iter(text) {
            // Zero-width guard: an occurrence already behind the prefix stays as is.
            if text[..m.start()].ends_with(&self.prefix) {
                continue;
            }
            output.push_str(&text[last..m.start()]);
            output.push_str(&self.replacement);
            last = m.end();
            changes += 1;
        }

        if changes == 0 {
            return Rewrite {
                text: Cow::Borrowed(text),
                changes,
            };
        }
        output.push_str(&text[last..]);
        Rewrite {
            text: Cow::Owned(output),
            changes,
        }
    }
}

/// A compiled [`Operation`], ready to be applied to file contents.
pub enum Rule {
    StripAttribute(AttributeRule),
    /// One rule per identifier, applied cumulatively in order.
    PrefixIdentifiers(Vec<PrefixRule>),
}

impl Rule {
    /// Compiles the patterns an operation needs.
    pub fn compile(operation: &Operation) -> Result<Self> {
        match operation {
            Operation::StripAttribute {
                attribute,
                declaration,
            } => Ok(Rule::StripAttribute(AttributeRule::new(attribute, declaration)?)),
            Operation::PrefixIdentifiers {
                prefix,
                identifiers,
            } => {
                if identifiers.is_empty() {
                    return Err("prefix_identifiers: at least one identifier is required".into());
                }
                let rules = identifiers
                    .iter()
                    .map(|identifier| PrefixRule::new(prefix, identifier))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Rule::PrefixIdentifiers(rules))
            }
        }
    }

    /// Applies the rule to `text` without touching the filesystem.
    pub fn apply<'a>(&self, text: &'a str) -> Rewrite<'a> {
        match self {
            Rule::StripAttribute(rule) => rule.apply(text),
            Rule::PrefixIdentifiers(rules) => {
                let mut current = Cow::Borrowed(text);
                let mut total = 0;
                for rule in rules {
                    let Rewrite { text: next, changes } = rule.apply(current.as_ref());
                    if changes > 0 {
                        tracing::debug!(
                            identifier = %rule.replacement,
                            changes,
                            "prefixed identifier occurrences"
                        );
                        total += changes;
                        current = Cow::Owned(next.into_owned());
                    }
                }
                Rewrite {
                    text: current,
                    changes: total,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mesh_hide_rule() -> AttributeRule {
        AttributeRule::new(SERIALIZE_FIELD, SLOT_ASSET_FIELD).unwrap()
    }

    fn sss_rule() -> Rule {
        Rule::compile(&Operation::PrefixIdentifiers {
            prefix: SSS_PREFIX.to_string(),
            identifiers: SSS_IDENTIFIERS.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap()
    }

    #[test]
    fn test_strip_attribute_removes_line() {
        let input = "public class MeshHideAsset\n{\n    [SerializeField]\n    public SlotDataAsset asset;\n}\n";
        let rewrite = mesh_hide_rule().apply(input);

        assert_eq!(rewrite.changes, 1);
        assert_eq!(
            rewrite.text,
            "public class MeshHideAsset\n{\n    public SlotDataAsset asset;\n}\n"
        );
    }

    #[test]
    fn test_strip_attribute_only_first_match() {
        let input = "[SerializeField]\npublic SlotDataAsset asset;\n[SerializeField]\npublic SlotDataAsset asset;\n";
        let rewrite = mesh_hide_rule().apply(input);

        assert_eq!(
            rewrite.text,
            "public SlotDataAsset asset;\n[SerializeField]\npublic SlotDataAsset asset;\n"
        );
    }

    #[test]
    fn test_strip_attribute_tolerates_spacing() {
        let input = "\t[SerializeField]  \r\n\tpublic   SlotDataAsset\tasset;\n";
        let rewrite = mesh_hide_rule().apply(input);

        assert_eq!(rewrite.text, "\tpublic   SlotDataAsset\tasset;\n");
    }

    #[test]
    fn test_strip_attribute_ignores_other_fields() {
        let input = "[SerializeField]\nprivate SlotDataAsset asset;\n[SerializeField]\npublic string assetName;\n";
        let rewrite = mesh_hide_rule().apply(input);

        assert_eq!(rewrite.changes, 0);
        assert!(!rewrite.differs_from(input));
        assert_eq!(rewrite.text, input);
    }

    #[test]
    fn test_strip_attribute_requires_line_break() {
        let input = "[SerializeField] public SlotDataAsset asset;\n";
        assert_eq!(mesh_hide_rule().apply(input).changes, 0);
    }

    #[test]
    fn test_strip_attribute_is_idempotent() {
        let rule = mesh_hide_rule();
        let once = rule.apply("[SerializeField]\npublic SlotDataAsset asset;\n").text.into_owned();
        let twice = rule.apply(&once);

        assert_eq!(twice.changes, 0);
        assert_eq!(twice.text, once);
    }

    #[test]
    fn test_prefix_rule_skips_prefixed() {
        let rule = PrefixRule::new(SSS_PREFIX, "RoughnessToPerceptualRoughness").unwrap();
        let input = "a = RoughnessToPerceptualRoughness(r);\nb = SSS_RoughnessToPerceptualRoughness(r);\n";
        let rewrite = rule.apply(input);

        assert_eq!(rewrite.changes, 1);
        assert_eq!(
            rewrite.text,
            "a = SSS_RoughnessToPerceptualRoughness(r);\nb = SSS_RoughnessToPerceptualRoughness(r);\n"
        );
    }

    #[test]
    fn test_prefix_guard_without_word_boundary() {
        let rule = PrefixRule::new("ns::", "Sample").unwrap();
        let rewrite = rule.apply("Sample(); ns::Sample(); x.Sample();");

        assert_eq!(rewrite.changes, 2);
        assert_eq!(rewrite.text, "ns::Sample(); ns::Sample(); x.ns::Sample();");
    }

    #[test]
    fn test_three_bare_one_prefixed() {
        let input = "float a = RoughnessToPerceptualRoughness(x);\n\
                     float b = RoughnessToPerceptualRoughness(y);\n\
                     float c = SSS_RoughnessToPerceptualRoughness(z);\n\
                     float d = RoughnessToPerceptualRoughness(w);\n";
        let rewrite = sss_rule().apply(input);

        assert_eq!(rewrite.changes, 3);
        assert_eq!(rewrite.text.matches("SSS_RoughnessToPerceptualRoughness").count(), 4);
        assert!(!rewrite.text.contains("SSS_SSS_"));
    }

    #[test]
    fn test_overlapping_identifiers_stay_whole() {
        let input = "PerceptualRoughnessToPerceptualSmoothness(r); RoughnessToPerceptualSmoothness(r);";
        let rewrite = sss_rule().apply(input);

        assert_eq!(
            rewrite.text,
            "SSS_PerceptualRoughnessToPerceptualSmoothness(r); SSS_RoughnessToPerceptualSmoothness(r);"
        );
    }

    #[test]
    fn test_embedded_identifiers_left_alone() {
        let input = "x = UNITY_RoughnessToPerceptualRoughness(a); y = RoughnessToPerceptualRoughness2(b);";
        let rewrite = sss_rule().apply(input);

        assert_eq!(rewrite.changes, 0);
        assert_eq!(rewrite.text, input);
    }

    #[test]
    fn test_all_identifiers_renamed_once() {
        let input: String = SSS_IDENTIFIERS
            .iter()
            .map(|name| format!("real {name}(real v) {{ return v; }}\n"))
            .collect();
        let first = sss_rule().apply(&input).text.into_owned();
        let second = sss_rule().apply(&first);

        for name in SSS_IDENTIFIERS {
            assert!(first.contains(&format!("real SSS_{name}(real v)")));
        }
        assert_eq!(second.changes, 0);
        assert_eq!(second.text, first);
    }

    #[test]
    fn test_rule_compile_rejects_empty_input() {
        assert!(AttributeRule::new("", SLOT_ASSET_FIELD).is_err());
        assert!(AttributeRule::new(SERIALIZE_FIELD, "  ").is_err());
        assert!(PrefixRule::new("", "Name").is_err());
        assert!(
            Rule::compile(&Operation::PrefixIdentifiers {
                prefix: SSS_PREFIX.to_string(),
                identifiers: vec![],
            })
            .is_err()
        );
    }
}

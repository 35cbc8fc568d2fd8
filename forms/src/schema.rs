//! Declarative field rules and the pure `validate` function.

use std::collections::BTreeMap;

use crate::FieldError;

/// Field name → raw input, as a form holds it.
pub type FormValues = BTreeMap<String, String>;

/// A typed payload that can be checked against a [`Schema`].
pub trait FormPayload {
    fn to_values(&self) -> FormValues;
}

/// A single check on one field. Each rule carries the message shown when it
/// fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank after trimming.
    Required(String),
    MinLen(usize, String),
    MaxLen(usize, String),
    ExactLen(usize, String),
    /// ASCII digits only.
    Digits(String),
    Email(String),
    OneOf(Vec<String>, String),
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required(message.into())
    }

    pub fn min_len(len: usize, message: impl Into<String>) -> Self {
        Rule::MinLen(len, message.into())
    }

    pub fn max_len(len: usize, message: impl Into<String>) -> Self {
        Rule::MaxLen(len, message.into())
    }

    pub fn exact_len(len: usize, message: impl Into<String>) -> Self {
        Rule::ExactLen(len, message.into())
    }

    pub fn digits(message: impl Into<String>) -> Self {
        Rule::Digits(message.into())
    }

    pub fn email(message: impl Into<String>) -> Self {
        Rule::Email(message.into())
    }

    pub fn one_of<I, S>(allowed: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::OneOf(allowed.into_iter().map(Into::into).collect(), message.into())
    }

    /// Returns the failure message if `value` breaks this rule.
    fn check(&self, value: &str) -> Option<&str> {
        let len = value.chars().count();
        let ok = match self {
            Rule::Required(_) => !value.trim().is_empty(),
            Rule::MinLen(min, _) => len >= *min,
            Rule::MaxLen(max, _) => len <= *max,
            Rule::ExactLen(exact, _) => len == *exact,
            Rule::Digits(_) => value.chars().all(|c| c.is_ascii_digit()),
            Rule::Email(_) => is_email(value),
            Rule::OneOf(allowed, _) => allowed.iter().any(|a| a == value),
        };
        if ok {
            None
        } else {
            Some(self.message())
        }
    }

    fn message(&self) -> &str {
        match self {
            Rule::Required(m)
            | Rule::MinLen(_, m)
            | Rule::MaxLen(_, m)
            | Rule::ExactLen(_, m)
            | Rule::Digits(m)
            | Rule::Email(m)
            | Rule::OneOf(_, m) => m,
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// Rules for one named field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub rules: Vec<Rule>,
    /// Optional fields skip their rules while empty.
    pub optional: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            optional: false,
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// First failing rule for `value`, if any.
    pub fn check(&self, value: &str) -> Option<FieldError> {
        if self.optional && value.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find_map(|r| r.check(value))
            .map(|message| FieldError::new(&self.name, message))
    }
}

/// An ordered set of field specs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Validate `values`, reporting at most one error per field in schema
    /// order. Fields missing from `values` are checked as empty strings;
    /// values with no spec are ignored.
    pub fn validate(&self, values: &FormValues) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|spec| {
                let value = values.get(&spec.name).map(String::as_str).unwrap_or("");
                spec.check(value)
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a single field of `values`.
    pub fn validate_field(&self, name: &str, values: &FormValues) -> Option<FieldError> {
        let spec = self.fields.iter().find(|f| f.name == name)?;
        spec.check(values.get(name).map(String::as_str).unwrap_or(""))
    }

    /// Convenience for typed payloads.
    pub fn validate_payload<P>(&self, payload: &P) -> Result<(), Vec<FieldError>>
    where
        P: FormPayload + ?Sized,
    {
        self.validate(&payload.to_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn phone_schema() -> Schema {
        Schema::new().field(
            FieldSpec::new("phone")
                .rule(Rule::required("Phone is required"))
                .rule(Rule::digits("Digits only"))
                .rule(Rule::exact_len(10, "Enter 10 digits")),
        )
    }

    #[test]
    fn reports_first_failing_rule_only() {
        let errs = phone_schema()
            .validate(&values(&[("phone", "12ab")]))
            .unwrap_err();
        assert_eq!(errs, vec![FieldError::new("phone", "Digits only")]);
    }

    #[test]
    fn missing_field_is_checked_as_empty() {
        let errs = phone_schema().validate(&FormValues::new()).unwrap_err();
        assert_eq!(errs[0].message, "Phone is required");
    }

    #[test]
    fn passes_valid_values_and_ignores_unknown_fields() {
        assert!(phone_schema()
            .validate(&values(&[("phone", "9876543210"), ("extra", "")]))
            .is_ok());
    }

    #[test]
    fn optional_field_skips_rules_when_empty() {
        let schema = Schema::new().field(
            FieldSpec::new("otp")
                .optional()
                .rule(Rule::exact_len(6, "Enter 6 digit OTP")),
        );
        assert!(schema.validate(&values(&[("otp", "")])).is_ok());
        assert!(schema.validate(&values(&[("otp", "123")])).is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.co"));
        assert!(is_email("first.last@mail.example.org"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a@@b.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@b..co"));
    }

    #[test]
    fn one_of_checks_membership() {
        let rule = Rule::one_of(["admin", "viewer"], "Pick a role");
        assert_eq!(rule.check("admin"), None);
        assert_eq!(rule.check("owner"), Some("Pick a role"));
    }

    #[test]
    fn errors_follow_schema_order() {
        let schema = Schema::new()
            .field(FieldSpec::new("b").rule(Rule::required("b missing")))
            .field(FieldSpec::new("a").rule(Rule::required("a missing")));
        let errs = schema.validate(&FormValues::new()).unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }
}

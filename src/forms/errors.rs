use std::fmt::Write as _;

/// CSS class on rendered error lists, as front-end scripts look for it
pub const ERROR_LIST_CLASS: &str = "errorlist";

/// Validation messages attached to one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    messages: Vec<String>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render as `<ul class="errorlist"><li>..</li></ul>`, escaping each message.
    /// An empty list renders as the empty string.
    pub fn as_ul(&self) -> String {
        if self.messages.is_empty() {
            return String::new();
        }

        let mut html = format!("<ul class=\"{}\">", ERROR_LIST_CLASS);
        for message in &self.messages {
            let _ = write!(html, "<li>{}</li>", escape_html(message));
        }
        html.push_str("</ul>");
        html
    }
}

impl<S: Into<String>> FromIterator<S> for ErrorList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Per-field errors in the order the fields were validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: Vec<(String, ErrorList)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to `field`, creating its list on first use
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, list)) => list.push(message),
            None => {
                let mut list = ErrorList::new();
                list.push(message);
                self.fields.push((field.to_string(), list));
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&ErrorList> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, list)| list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorList)> {
        self.fields.iter().map(|(name, list)| (name.as_str(), list))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

/// DOM id of a field's widget: `id_` + optional `prefix-` + field name
pub fn field_dom_id(prefix: Option<&str>, field_name: &str) -> String {
    let mut id = String::from("id_");
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        id.push_str(prefix);
        id.push('-');
    }
    id.push_str(field_name);
    id
}

/// Name a field is submitted under: `prefix-name`, or the bare name
pub fn prefixed_name(prefix: Option<&str>, field_name: &str) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}-{}", prefix, field_name),
        None => field_name.to_string(),
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

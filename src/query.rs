//! Query builder - turns lookup parameters into a store filter / 查询构建
//!
//! Free text is split on whitespace, each token is escaped for literal
//! matching and the tokens are rejoined with `.*`, so a field matches when it
//! contains every token in order, case-insensitively, with anything between.
//! An exact identifier (id or certificate number) skips the text path.

use regex::Regex;
use serde::Deserialize;

use crate::error::QueryError;
use crate::models::Certificate;

/// Lookup endpoint query parameters / 查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupParams {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub holder: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Fields the free-text search runs over / 可搜索字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Holder,
    CertificateNumber,
    ComplianceBody,
    CountryOfOrigin,
    Address,
}

impl SearchField {
    /// Fields covered by the `search` parameter
    pub const ALL: [SearchField; 5] = [
        SearchField::Holder,
        SearchField::CertificateNumber,
        SearchField::ComplianceBody,
        SearchField::CountryOfOrigin,
        SearchField::Address,
    ];

    /// Column name in the certificates table
    pub fn column(self) -> &'static str {
        match self {
            SearchField::Holder => "holder",
            SearchField::CertificateNumber => "certificate_number",
            SearchField::ComplianceBody => "compliance_body",
            SearchField::CountryOfOrigin => "country_of_origin",
            SearchField::Address => "address",
        }
    }

    pub fn value(self, certificate: &Certificate) -> &str {
        match self {
            SearchField::Holder => &certificate.holder,
            SearchField::CertificateNumber => &certificate.certificate_number,
            SearchField::ComplianceBody => &certificate.compliance_body,
            SearchField::CountryOfOrigin => &certificate.country_of_origin,
            SearchField::Address => &certificate.address,
        }
    }
}

/// Split a phrase on whitespace / 按空白分词
pub fn tokenize(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(str::to_string).collect()
}

/// Build the loose pattern text for a phrase, `None` if it has no tokens.
///
/// `(?is)` makes the match case-insensitive and lets `.*` cross line breaks
/// in multi-line addresses.
pub fn loose_pattern_source(phrase: &str) -> Option<String> {
    let tokens = tokenize(phrase);
    if tokens.is_empty() {
        return None;
    }
    let body = tokens
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join(".*");
    Some(format!("(?is){}", body))
}

/// A compiled loose regex / 编译后的模糊匹配模式
#[derive(Debug, Clone)]
pub struct LoosePattern {
    tokens: Vec<String>,
    regex: Regex,
}

impl LoosePattern {
    /// Compile a phrase. Returns `Ok(None)` for blank input.
    pub fn new(phrase: &str) -> Result<Option<Self>, QueryError> {
        let source = match loose_pattern_source(phrase) {
            Some(source) => source,
            None => return Ok(None),
        };
        let regex = Regex::new(&source)?;
        Ok(Some(Self {
            tokens: tokenize(phrase),
            regex,
        }))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One loose pattern OR-ed across several fields
#[derive(Debug, Clone)]
pub struct TextClause {
    pub pattern: LoosePattern,
    pub fields: Vec<SearchField>,
}

impl TextClause {
    pub fn matches(&self, certificate: &Certificate) -> bool {
        self.fields
            .iter()
            .any(|field| self.pattern.is_match(field.value(certificate)))
    }
}

/// Store filter / 查询过滤条件
#[derive(Debug, Clone)]
pub enum Filter {
    ById(String),
    ByCertificateNumber(String),
    /// AND of clauses; no clauses matches every record
    Text(Vec<TextClause>),
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Filter {
    /// Build a filter. Precedence: id, then certificateNumber, then free text.
    pub fn from_params(params: &LookupParams) -> Result<Self, QueryError> {
        if let Some(id) = non_blank(&params.id) {
            return Ok(Filter::ById(id.to_string()));
        }
        if let Some(number) = non_blank(&params.certificate_number) {
            return Ok(Filter::ByCertificateNumber(number.to_string()));
        }

        let mut clauses = Vec::new();
        if let Some(pattern) = LoosePattern::new(params.search.as_deref().unwrap_or(""))? {
            clauses.push(TextClause {
                pattern,
                fields: SearchField::ALL.to_vec(),
            });
        }
        if let Some(pattern) = LoosePattern::new(params.holder.as_deref().unwrap_or(""))? {
            clauses.push(TextClause {
                pattern,
                fields: vec![SearchField::Holder],
            });
        }
        Ok(Filter::Text(clauses))
    }

    pub fn is_identifier_lookup(&self) -> bool {
        matches!(self, Filter::ById(_) | Filter::ByCertificateNumber(_))
    }

    pub fn matches(&self, certificate: &Certificate) -> bool {
        match self {
            Filter::ById(id) => certificate.id == *id,
            Filter::ByCertificateNumber(number) => certificate.certificate_number == *number,
            Filter::Text(clauses) => clauses.iter().all(|c| c.matches(certificate)),
        }
    }
}

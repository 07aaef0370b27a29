//! EcoConsciência HTML Parser
//!
//! HTML5 parsing built on html5ever, producing [`eco_dom::Document`]s.

mod parser;

pub use eco_dom::Document;
pub use parser::HtmlParser;

/// Parse an HTML string into a document located at `url`
pub fn parse(html: &str, url: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse_with_url(html, url)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tree: {0}")]
    Tree(#[from] eco_dom::DomError),
}

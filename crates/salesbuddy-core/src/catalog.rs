//! Product catalog files.
//!
//! The CSV reader is deliberately simple: rows split on `\n`, columns on `,`,
//! and double quotes are stripped. Quoted commas and embedded newlines are
//! not supported.

use crate::{Error, Result, profile::NewProduct};

/// Parse a `name,description` product catalog.
///
/// A first line containing `name` (case-insensitive) is treated as a header.
/// Blank lines and rows with an empty name are skipped; a missing description
/// becomes the empty string.
pub fn parse_products_csv(text: &str) -> Vec<NewProduct> {
  let mut lines = text.split('\n').peekable();
  if lines
    .peek()
    .is_some_and(|first| first.to_lowercase().contains("name"))
  {
    lines.next();
  }

  lines
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .filter_map(|line| {
      let mut columns = line.split(',').map(clean_column);
      let name = columns.next().filter(|n| !n.is_empty())?;
      let description = columns.next().unwrap_or_default();
      Some(NewProduct { name, description })
    })
    .collect()
}

fn clean_column(column: &str) -> String { column.trim().replace('"', "") }

/// Whether an upload should be read as a CSV catalog.
pub fn is_csv(file_name: &str, content_type: Option<&str>) -> bool {
  file_name.to_lowercase().ends_with(".csv")
    || content_type.is_some_and(|ct| ct.starts_with("text/csv"))
}

/// Extensions accepted for demo material.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "ppt", "pptx", "doc", "docx"];

/// Reject demo uploads that are not a document or slide deck.
pub fn ensure_document(file_name: &str) -> Result<()> {
  let accepted = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_lowercase())
    .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()));
  if !accepted {
    return Err(Error::UnsupportedFile(file_name.to_owned()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_and_quoted_description() {
    let products = parse_products_csv("name,description\nWidget,\"A nice widget\"");
    assert_eq!(products, vec![NewProduct::new("Widget", "A nice widget")]);
  }

  #[test]
  fn no_header_keeps_first_row() {
    let products = parse_products_csv("Gadget,Shiny\nGizmo,");
    assert_eq!(
      products,
      vec![NewProduct::new("Gadget", "Shiny"), NewProduct::new("Gizmo", "")]
    );
  }

  #[test]
  fn crlf_blank_lines_and_missing_names() {
    let csv = "Name,Description\r\n\r\nAlpha,First\r\n,orphan\r\n  \r\nBeta\r\n";
    let products = parse_products_csv(csv);
    assert_eq!(
      products,
      vec![NewProduct::new("Alpha", "First"), NewProduct::new("Beta", "")]
    );
  }

  #[test]
  fn embedded_commas_split() {
    let products = parse_products_csv("name,description\nWidget,\"big, blue\"");
    assert_eq!(products, vec![NewProduct::new("Widget", "big")]);
  }

  #[test]
  fn csv_detection() {
    assert!(is_csv("catalog.CSV", None));
    assert!(is_csv("upload", Some("text/csv; charset=utf-8")));
    assert!(!is_csv("deck.pdf", Some("application/pdf")));
  }

  #[test]
  fn document_extensions() {
    assert!(ensure_document("Deck.PPTX").is_ok());
    assert!(ensure_document("brochure.pdf").is_ok());
    assert!(ensure_document("notes.txt").is_err());
    assert!(ensure_document("README").is_err());
  }
}

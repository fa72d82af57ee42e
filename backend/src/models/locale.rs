//! Locale-variant enumerations.
//!
//! Uploads are typed by hand in Spanish, English or Portuguese, with or
//! without accents. [`fold_key`] reduces any of those spellings to one
//! lookup key; the enums below map keys to canonical values.

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercase, strip diacritics and collapse whitespace.
///
/// Text is decomposed (NFD) first, so precomposed and decomposed accents
/// fold the same way. Used for enum tables and for every name-keyed lookup
/// cache.
pub fn fold_key(text: &str) -> String {
    let folded: String = text
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Data Type
// =============================================================================

/// How a nutrient value was obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    /// Measured in a laboratory.
    Analytic,
    /// Derived from other values (e.g. energy from macronutrients).
    Calculated,
    /// Imputed from a similar food.
    Assumed,
    /// Taken from another composition table.
    Borrowed,
}

impl DataType {
    /// Parse any locale spelling. Unknown text yields `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        match fold_key(text).as_str() {
            "analitico" | "analitica" | "anlitico" | "analytic" | "analytical"
            | "analitico/a" => Some(Self::Analytic),
            "calculado" | "calculada" | "calculated" | "calculo" => Some(Self::Calculated),
            "asumido" | "asumida" | "assumed" | "imputado" | "imputada" | "imputed" => {
                Some(Self::Assumed)
            }
            "prestado" | "prestada" | "borrowed" | "emprestado" => Some(Self::Borrowed),
            _ => None,
        }
    }
}

// =============================================================================
// Reference Type
// =============================================================================

/// Kind of bibliographic reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Article,
    Book,
    Report,
    Thesis,
    Website,
}

impl ReferenceType {
    /// Parse any locale spelling. Unknown text yields `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        match fold_key(text).as_str() {
            "articulo" | "revista" | "article" | "artigo" | "journal" => Some(Self::Article),
            "libro" | "book" | "livro" => Some(Self::Book),
            "informe" | "reporte" | "report" | "relatorio" => Some(Self::Report),
            "tesis" | "thesis" | "tese" => Some(Self::Thesis),
            "sitio web" | "pagina web" | "website" | "web" | "site" => Some(Self::Website),
            _ => None,
        }
    }
}

/// Human-readable table of accepted spellings (for the CLI).
pub fn locale_description() -> String {
    r#"Accepted spellings (case and accents are ignored):

| Field | Canonical | Accepted |
|-------|-----------|----------|
| data type | ANALYTIC | analitico, analitica, anlitico, analytic, analytical |
| data type | CALCULATED | calculado, calculada, calculated, calculo |
| data type | ASSUMED | asumido, asumida, assumed, imputado, imputada, imputed |
| data type | BORROWED | prestado, prestada, borrowed, emprestado |
| reference type | ARTICLE | articulo, revista, article, artigo, journal |
| reference type | BOOK | libro, book, livro |
| reference type | REPORT | informe, reporte, report, relatorio |
| reference type | THESIS | tesis, thesis, tese |
| reference type | WEBSITE | sitio web, pagina web, website, web, site |

A cell holding "-", "N/A" or "NA" counts as empty."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_key() {
        assert_eq!(fold_key("  Analítico "), "analitico");
        assert_eq!(fold_key("Página   Web"), "pagina web");
        assert_eq!(fold_key("AÇÚCAR"), "acucar");
        assert_eq!(fold_key("Ångström Ñandú"), "angstrom nandu");
    }

    #[test]
    fn test_decomposed_accents() {
        assert_eq!(fold_key("Anali\u{301}tico"), fold_key("Analítico"));
        assert_eq!(DataType::from_text("Anali\u{301}tico"), Some(DataType::Analytic));
        assert_eq!(
            ReferenceType::from_text("Arti\u{301}culo"),
            Some(ReferenceType::Article)
        );
    }

    #[test]
    fn test_data_type_variants() {
        assert_eq!(DataType::from_text("Analítico"), Some(DataType::Analytic));
        assert_eq!(DataType::from_text("ANALITICA"), Some(DataType::Analytic));
        assert_eq!(DataType::from_text("anlitico"), Some(DataType::Analytic));
        assert_eq!(DataType::from_text("Calculada"), Some(DataType::Calculated));
        assert_eq!(DataType::from_text("emprestado"), Some(DataType::Borrowed));
        assert_eq!(DataType::from_text("medido"), None);
    }

    #[test]
    fn test_reference_type_variants() {
        assert_eq!(ReferenceType::from_text("Revista"), Some(ReferenceType::Article));
        assert_eq!(ReferenceType::from_text("Artículo"), Some(ReferenceType::Article));
        assert_eq!(ReferenceType::from_text("Sitio Web"), Some(ReferenceType::Website));
        assert_eq!(ReferenceType::from_text("Tese"), Some(ReferenceType::Thesis));
        assert_eq!(ReferenceType::from_text("poster"), None);
    }

    #[test]
    fn test_canonical_serialization() {
        let json = serde_json::to_string(&DataType::Analytic).unwrap();
        assert_eq!(json, "\"ANALYTIC\"");
        let parsed: ReferenceType = serde_json::from_str("\"WEBSITE\"").unwrap();
        assert_eq!(parsed, ReferenceType::Website);
    }
}

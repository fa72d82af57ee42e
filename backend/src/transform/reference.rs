//! Reference assembly.
//!
//! Which fields a reference needs depends on its type:
//!
//! | Type | Also required |
//! |------|---------------|
//! | article | journal, volume, pages |
//! | book, website | other |
//! | any | year, unless a volume year is given |

use crate::cache::ReferencesData;
use crate::models::{FieldValue, RecordStatus, Reference, ReferenceType};
use crate::parser::Grid;
use crate::validation::is_ordered_range;

use super::blocks::ReferenceRow;
use super::fields::{
    parse_enum, parse_integer, parse_page_range, parse_reference_code, parse_text,
    parse_volume_issue, split_authors,
};
use super::food::resolve_or_new;
use super::layout::reference_col;

/// Build a reference from its row. Flags are left for the diff pass.
pub fn assemble_reference<G: Grid + ?Sized>(
    row: &ReferenceRow<'_, G>,
    data: &ReferencesData,
) -> Reference {
    let reference_type =
        parse_enum(row.cell(reference_col::TYPE), ReferenceType::from_text).require();
    let kind = reference_type.parsed;
    let is_article = kind == Some(ReferenceType::Article);
    let needs_other = matches!(kind, Some(ReferenceType::Book | ReferenceType::Website));

    let mut authors: Vec<FieldValue<i64>> = split_authors(row.cell(reference_col::AUTHORS))
        .iter()
        .map(|name| resolve_or_new(name, &data.authors))
        .collect();
    if authors.is_empty() {
        authors.push(FieldValue::invalid(None, ""));
    }

    let volume_year = parse_integer(row.cell(reference_col::VOLUME_YEAR));
    let year = parse_integer(row.cell(reference_col::YEAR));
    let year = if volume_year.parsed.is_some() {
        year
    } else {
        year.require()
    };

    let (volume, issue) = parse_volume_issue(row.cell(reference_col::VOLUME_ISSUE));
    let (page_start, page_end) = parse_page_range(row.cell(reference_col::PAGES));
    let pages_ordered = is_ordered_range(page_start.parsed, page_end.parsed);

    let journal = resolve_or_new(row.cell(reference_col::JOURNAL), &data.journals);
    let other = parse_text(row.cell(reference_col::OTHER));

    Reference {
        row: row.row,
        code: parse_reference_code(row.cell(reference_col::CODE)).require(),
        title: parse_text(row.cell(reference_col::TITLE)).require(),
        reference_type,
        authors,
        year: Some(year),
        volume: Some(require_if(volume, is_article)),
        issue: Some(issue),
        volume_year: Some(volume_year),
        page_start: Some(require_if(page_start, is_article).validate(pages_ordered)),
        page_end: Some(require_if(page_end, is_article).validate(pages_ordered)),
        journal: Some(require_if(journal, is_article)),
        city: Some(resolve_or_new(row.cell(reference_col::CITY), &data.cities)),
        other: Some(require_if(other, needs_other)),
        flags: RecordStatus::default(),
    }
}

fn require_if<T>(field: FieldValue<T>, required: bool) -> FieldValue<T> {
    if required {
        field.require()
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::blocks::reference_rows;
    use crate::transform::fixtures::{references_data, references_sheet};

    fn assemble(row: [&str; 11]) -> Reference {
        let grid = references_sheet(&[row]);
        let row = reference_rows(&grid).next().unwrap();
        assemble_reference(&row, &references_data())
    }

    #[test]
    fn test_article() {
        let reference = assemble([
            "12",
            "Revista",
            "Pérez J; Gómez A",
            "Composición de frutas",
            "Lima",
            "2019",
            "",
            "Archivos Latinoamericanos de Nutrición",
            "Vol. 69, No 2",
            "",
            "120-135",
        ]);

        assert_eq!(reference.code(), Some(12));
        assert_eq!(reference.reference_type.parsed, Some(ReferenceType::Article));

        assert_eq!(reference.authors[0].parsed, Some(7));
        assert!(reference.authors[1].is_new());
        assert_eq!(reference.authors[1].raw, "Gómez A");

        assert_eq!(reference.city.as_ref().unwrap().parsed, Some(4));
        assert_eq!(reference.journal.as_ref().unwrap().parsed, Some(9));
        assert_eq!(reference.volume.as_ref().unwrap().parsed, Some(69));
        assert_eq!(reference.issue.as_ref().unwrap().parsed, Some(2));
        assert_eq!(reference.page_end.as_ref().unwrap().parsed, Some(135));
        assert!(reference.other.as_ref().unwrap().is_valid());
    }

    #[test]
    fn test_article_requirements() {
        let reference = assemble(["13", "article", "Silva M", "Tabla", "", "2001", "", "", "", "", ""]);

        assert!(!reference.journal.as_ref().unwrap().is_valid());
        assert!(!reference.volume.as_ref().unwrap().is_valid());
        assert!(!reference.page_start.as_ref().unwrap().is_valid());
        assert!(reference.issue.as_ref().unwrap().is_valid());
    }

    #[test]
    fn test_new_journal_satisfies_article() {
        let reference = assemble([
            "14", "artigo", "Silva M", "Tabla", "", "2001", "", "Revista Nueva", "3(1)", "", "1-9",
        ]);

        let journal = reference.journal.as_ref().unwrap();
        assert!(journal.is_valid() && journal.is_new());
    }

    #[test]
    fn test_book_requires_other() {
        let reference = assemble(["15", "Libro", "Silva M", "Tabla", "", "2001", "", "", "", "", ""]);
        assert!(!reference.other.as_ref().unwrap().is_valid());

        let reference = assemble([
            "15", "Libro", "Silva M", "Tabla", "", "2001", "Editorial X", "", "", "", "",
        ]);
        assert!(reference.other.as_ref().unwrap().is_valid());
    }

    #[test]
    fn test_year_or_volume_year() {
        let reference = assemble(["16", "Informe", "Silva M", "Tabla", "", "", "", "", "", "", ""]);
        assert!(!reference.year.as_ref().unwrap().is_valid());

        let reference = assemble(["16", "Informe", "Silva M", "Tabla", "", "", "", "", "", "1998", ""]);
        assert!(reference.year.as_ref().unwrap().is_valid());
    }

    #[test]
    fn test_leading_minus_on_year() {
        let reference = assemble(["16", "Informe", "Silva M", "Tabla", "", "-2019", "", "", "", "", ""]);
        let year = reference.year.as_ref().unwrap();
        assert!(year.is_valid());
        assert_eq!(year.parsed, Some(2019));
    }

    #[test]
    fn test_required_fields() {
        let reference = assemble(["1a", "novela", "", "", "", "2001", "", "", "", "", "30-10"]);

        assert!(!reference.code.is_valid());
        assert!(!reference.reference_type.is_valid());
        assert!(!reference.title.is_valid());
        assert_eq!(reference.authors.len(), 1);
        assert!(!reference.authors[0].is_valid());
        assert!(!reference.page_start.as_ref().unwrap().is_valid());
        assert!(!reference.page_end.as_ref().unwrap().is_valid());
    }
}

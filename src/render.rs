use std::io::Write;

use serde_json::json;

use crate::{
    catalog::ResultsView,
    error::Result,
    facets::{Facet, FacetIndex},
    projector::{DisplayRecord, FieldKey},
};

/// Text shown in place of a link.
const LINK_TEXT: &str = "Ouvrir";

/// Write results for a terminal reader.
///
/// `limit` caps how many records are printed; the header always shows the
/// full match count.
pub fn format_human(
    out: &mut impl Write,
    view: &ResultsView<'_>,
    limit: Option<usize>,
) -> Result<()> {
    writeln!(out, "Résultats ({})", view.match_count)?;
    if view.records.is_empty() {
        writeln!(out, "Aucun document ne correspond aux filtres.")?;
        return Ok(());
    }

    let shown = limit.unwrap_or(view.records.len()).min(view.records.len());
    for (i, record) in view.records.iter().take(shown).enumerate() {
        writeln!(out)?;
        write_record(out, i + 1, record)?;
    }

    if shown < view.records.len() {
        writeln!(out, "\n... {} de plus", view.records.len() - shown)?;
    }
    Ok(())
}

fn write_record(
    out: &mut impl Write,
    rank: usize,
    record: &DisplayRecord,
) -> Result<()> {
    let title = if record.title.is_empty() {
        "(sans titre)"
    } else {
        &record.title
    };
    if record.doc_type.is_empty() {
        writeln!(out, "{rank:>3}. {title}")?;
    } else {
        writeln!(out, "{rank:>3}. [{}] {title}", record.doc_type)?;
    }

    for field in [
        FieldKey::Authors,
        FieldKey::Year,
        FieldKey::Language,
        FieldKey::Keywords,
        FieldKey::Summary,
    ] {
        let value = record.get(field);
        if !value.is_empty() {
            writeln!(out, "     {}: {}", field.label(), value)?;
        }
    }
    if !record.link.is_empty() {
        writeln!(out, "     {LINK_TEXT}: {}", record.link)?;
    }
    Ok(())
}

/// Write results as a single JSON object.
pub fn format_json(
    out: &mut impl Write,
    view: &ResultsView<'_>,
    limit: Option<usize>,
) -> Result<()> {
    let records: Vec<_> = view
        .records
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    let value = json!({
        "match_count": view.match_count,
        "total": view.total,
        "records": records,
    });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

/// Write the non-empty links of matching records, one per line.
pub fn format_links(out: &mut impl Write, view: &ResultsView<'_>) -> Result<()> {
    for record in &view.records {
        if !record.link.is_empty() {
            writeln!(out, "{}", record.link)?;
        }
    }
    Ok(())
}

const FACET_SECTIONS: [(Facet, &str); 3] = [
    (Facet::Type, "Type de document"),
    (Facet::Language, "Langue"),
    (Facet::Keyword, "Mots-clés"),
];

/// Write the facet option lists with their record counts.
pub fn format_facets_human(out: &mut impl Write, facets: &FacetIndex) -> Result<()> {
    for (i, (facet, heading)) in FACET_SECTIONS.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{heading}:")?;
        let mut any = false;
        for (value, count) in facets.counts(*facet) {
            writeln!(out, "  {value} ({count})")?;
            any = true;
        }
        if !any {
            writeln!(out, "  (aucun)")?;
        }
    }
    Ok(())
}

/// Write the facet option lists as JSON arrays.
pub fn format_facets_json(out: &mut impl Write, facets: &FacetIndex) -> Result<()> {
    let value = json!({
        "types": facets.types(),
        "languages": facets.languages(),
        "keywords": facets.keywords(),
    });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

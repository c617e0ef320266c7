//! Indicator extraction from a rendered municipality profile page.
//!
//! The portal renders the demographic panel as `tr.lista__indicador`
//! rows. Rows are matched by label text first; the `tabindex` ordinal
//! and then raw document order are fallbacks for layouts where the
//! labels are missing, since the ordinal scheme is what the portal
//! actually guarantees. Within a row the value is the element sitting
//! immediately before the `span.unidade` unit label.
//!
//! Extraction never fails: a missing row or value turns into `None` for
//! that field only.

use scraper::{ElementRef, Html, Selector};

/// Rendered in the CSV for any field that could not be extracted.
pub const UNAVAILABLE: &str = "Informação não disponível";

/// The three demographic indicators of one profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorValues {
    pub last_census_population: Option<String>,
    pub estimated_population: Option<String>,
    pub density: Option<String>,
}

/// Lowercased label fragments identifying each indicator row, paired
/// with its ordinal position in the fixed panel layout.
const LAST_CENSUS: (&str, usize) = ("último censo", 1);
const ESTIMATED: (&str, usize) = ("estimada", 2);
const DENSITY: (&str, usize) = ("densidade", 3);

/// Parse the three indicator values out of page markup.
pub fn extract_indicators(html: &str) -> IndicatorValues {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse("tr.lista__indicador").unwrap();
    let rows: Vec<ElementRef> = document.select(&row_sel).collect();

    IndicatorValues {
        last_census_population: indicator_value(&rows, LAST_CENSUS),
        estimated_population: indicator_value(&rows, ESTIMATED),
        density: indicator_value(&rows, DENSITY),
    }
}

/// Locate one indicator's row (label text, then `tabindex` ordinal, then
/// document position) and read its value.
fn indicator_value(rows: &[ElementRef], (label, ordinal): (&str, usize)) -> Option<String> {
    let row = rows
        .iter()
        .find(|r| row_text(r).to_lowercase().contains(label))
        .or_else(|| {
            let ord = ordinal.to_string();
            rows.iter()
                .find(move |r| r.value().attr("tabindex") == Some(ord.as_str()))
        })
        .or_else(|| rows.get(ordinal - 1))?;

    value_before_unit(row)
}

fn row_text(row: &ElementRef) -> String {
    row.text().collect::<String>()
}

/// Text of the element immediately preceding the `span.unidade` unit
/// label inside `row`.
fn value_before_unit(row: &ElementRef) -> Option<String> {
    let unit_sel = Selector::parse("span.unidade").unwrap();
    let unit = row.select(&unit_sel).next()?;

    let value_el = unit
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .next()?;

    let text = value_el.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

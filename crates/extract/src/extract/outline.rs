use crate::consts;
use scraper::{ElementRef, Html};

/// The `#work_outline` table of a work page: row labels (`th`) mapped to
/// their value cells (`td`), in document order.
#[derive(Debug)]
pub struct Outline<'a> {
    rows: Vec<(String, ElementRef<'a>)>,
}

/// Outline Internals
impl<'a> Outline<'a> {
    pub(crate) fn new(document: &'a Html) -> Self {
        let rows = document
            .select(&consts::OUTLINE_ROW_SELECTOR)
            .filter_map(|row| {
                let th = row.select(&consts::TH_SELECTOR).next()?;
                let td = row.select(&consts::TD_SELECTOR).next()?;
                Some((th.text().collect::<String>().trim().to_string(), td))
            })
            .collect();
        Self { rows }
    }

    /// Labels sometimes carry trailing annotations, so match on prefix.
    fn find_by_label_prefix(&self, prefix: &str) -> Option<ElementRef<'a>> {
        self.rows.iter().find(|(label, _)| label.starts_with(prefix)).map(|(_, td)| *td)
    }
}

/// Outline Public
impl<'a> Outline<'a> {
    /// Series name, preferring the linked text over the raw cell text.
    pub fn series(&self) -> Option<String> {
        let td = self.find_by_label_prefix(consts::SERIES_LABEL)?;
        let text = match td.select(&consts::ANCHOR_SELECTOR).next() {
            Some(a) => a.text().collect::<String>(),
            None => td.text().collect::<String>(),
        };
        Some(text.trim().to_string()).filter(|s| !s.is_empty())
    }
}

/// Plain-text rendering of a decoded document.
///
/// [`TextWriter`] builds the report section by section into one buffer,
/// writing through `std::fmt::Write` to avoid intermediate strings.
use super::ReportDocument;
use crate::common::{Error, Result};
use crate::datamodel::CalculationKind;
use crate::report::Action;

/// Longest formula excerpt shown per measure.
const FORMULA_PREVIEW: usize = 80;

pub(crate) struct TextWriter {
    buffer: String,
}

impl TextWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(4096),
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    /// Write a formatted string to the buffer.
    pub fn write_fmt(&mut self, args: std::fmt::Arguments) -> Result<()> {
        use std::fmt::Write as FmtWrite;
        self.buffer.write_fmt(args).map_err(|e| Error::Other(e.to_string()))
    }

    fn heading(&mut self, title: &str) -> Result<()> {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        writeln!(self, "{}", title)?;
        writeln!(self, "{}", "=".repeat(title.chars().count()))
    }

    pub fn write_summary(&mut self, doc: &ReportDocument) -> Result<()> {
        let meta = &doc.metadata;
        self.heading("Summary")?;
        writeln!(self, "Version: {}", meta.version.as_deref().unwrap_or("unknown"))?;
        if let Some(release) = &meta.release {
            writeln!(self, "Release: {}", release)?;
        }
        writeln!(self, "Entries: {}", meta.entry_count)?;
        writeln!(
            self,
            "Tables: {} ({} columns), measures: {}, relationships: {}",
            meta.table_count, meta.column_count, meta.measure_count, meta.relationship_count
        )?;
        if meta.binary_data_model {
            writeln!(self, "Data model: binary backup only, not decoded")?;
        }
        writeln!(
            self,
            "Pages: {}, visuals: {}, bookmarks: {}, custom visuals: {}",
            meta.page_count, meta.visual_count, meta.bookmark_count, meta.custom_visual_count
        )?;
        if let Some(rows) = meta.total_rows {
            writeln!(self, "Rows: {}", rows)?;
        }
        if !meta.visual_types.is_empty() {
            let histogram: Vec<String> = meta
                .visual_types
                .iter()
                .map(|(label, count)| format!("{} {}", label, count))
                .collect();
            writeln!(self, "Visual types: {}", histogram.join(", "))?;
        }
        Ok(())
    }

    pub fn write_tables(&mut self, doc: &ReportDocument) -> Result<()> {
        let model = &doc.data_model;
        if model.tables.is_empty() {
            return Ok(());
        }
        self.heading("Tables")?;
        for table in &model.tables {
            let mut flags = String::new();
            if table.is_calculated {
                flags.push_str(" [calculated]");
            }
            if table.is_hidden {
                flags.push_str(" [hidden]");
            }
            writeln!(self, "{}{}", table.name, flags)?;
            for column in &table.columns {
                let marker = if column.is_calculated { " = ..." } else { "" };
                writeln!(self, "  - {}: {}{}", column.name, column.data_type, marker)?;
            }
        }

        if !model.relationships.is_empty() {
            self.heading("Relationships")?;
            for rel in &model.relationships {
                let mut line = format!("{} ({})", rel.describe(), rel.cardinality.label());
                if !rel.is_active {
                    line.push_str(" [inactive]");
                }
                if !rel.resolved {
                    line.push_str(" [unresolved]");
                }
                writeln!(self, "{}", line)?;
            }
        }
        Ok(())
    }

    pub fn write_measures(&mut self, doc: &ReportDocument) -> Result<()> {
        let mut measures = doc.data_model.calculations_of(CalculationKind::Measure).peekable();
        if measures.peek().is_none() {
            return Ok(());
        }
        self.heading("Measures")?;
        for measure in measures {
            let formula = measure.expression.replace(['\r', '\n'], " ");
            let preview: String = formula.chars().take(FORMULA_PREVIEW).collect();
            let ellipsis = if formula.chars().count() > FORMULA_PREVIEW { "..." } else { "" };
            writeln!(self, "{} = {}{}", measure.qualified_name(), preview, ellipsis)?;
        }
        Ok(())
    }

    pub fn write_queries(&mut self, doc: &ReportDocument) -> Result<()> {
        if doc.data_model.queries.is_empty() {
            return Ok(());
        }
        self.heading("Queries")?;
        for query in &doc.data_model.queries {
            writeln!(self, "{} ({})", query.name, query.source_kind.label())?;
        }
        Ok(())
    }

    pub fn write_pages(&mut self, doc: &ReportDocument) -> Result<()> {
        if doc.report.pages.is_empty() {
            return Ok(());
        }
        self.heading("Pages")?;
        for page in &doc.report.pages {
            let hidden = if page.is_hidden { " [hidden]" } else { "" };
            writeln!(
                self,
                "{}. {} ({}x{}, {} visuals){}",
                page.ordinal + 1,
                page.display_name,
                page.width,
                page.height,
                page.visuals.len(),
                hidden
            )?;
            for visual in &page.visuals {
                write!(self, "  - {} [{}]", visual.display_type, visual.id)?;
                if visual.action != Action::None {
                    write!(self, " -> {}", visual.action.label())?;
                    if let Some(target) = visual.action.bookmark().or_else(|| visual.action.page()) {
                        write!(self, " '{}'", target)?;
                    }
                }
                self.buffer.push('\n');
                if let Some(line) = visual.text.lines().find(|l| !l.trim().is_empty()) {
                    writeln!(self, "      \"{}\"", line.trim())?;
                }
            }
        }
        Ok(())
    }

    pub fn write_bookmarks(&mut self, doc: &ReportDocument) -> Result<()> {
        let report = &doc.report;
        if report.bookmarks.is_empty() {
            return Ok(());
        }
        self.heading("Bookmarks")?;
        for group in &report.bookmark_groups {
            writeln!(self, "{}", group.display_name)?;
            for name in &group.bookmarks {
                let Some(bookmark) = report.bookmark(name) else {
                    continue;
                };
                write!(self, "  - {}", bookmark.display_name)?;
                if !bookmark.triggers.is_empty() {
                    write!(self, " ({} triggers)", bookmark.triggers.len())?;
                }
                self.buffer.push('\n');
            }
        }
        Ok(())
    }

    pub fn write_custom_visuals(&mut self, doc: &ReportDocument) -> Result<()> {
        if doc.report.custom_visuals.is_empty() {
            return Ok(());
        }
        self.heading("Custom visuals")?;
        for visual in &doc.report.custom_visuals {
            let version = visual.version.as_deref().map(|v| format!(" {}", v)).unwrap_or_default();
            let embedded = if visual.embedded { " [embedded]" } else { "" };
            writeln!(self, "{} ({}){}{}", visual.display_name, visual.id, version, embedded)?;
        }
        Ok(())
    }

    pub fn write_warnings(&mut self, doc: &ReportDocument) -> Result<()> {
        if doc.warnings.is_empty() {
            return Ok(());
        }
        self.heading("Warnings")?;
        for warning in &doc.warnings {
            writeln!(self, "{}", warning)?;
        }
        Ok(())
    }
}

use crate::triage::PreflightReport;
use std::fmt;

/// Text report formatter for preflight results
pub struct TextReport<'a> {
    report: &'a PreflightReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a PreflightReport) -> Self {
        Self { report }
    }
}

fn angle(deg: Option<f64>) -> String {
    deg.map_or_else(|| "-".to_string(), |d| format!("{:.1}°", d))
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;

        writeln!(f, "Triage Preflight")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Quality:        {} ({:.2})",
            report.quality.overall.label, report.quality.overall.quality_score
        )?;
        match &report.rejection {
            Some(reason) => writeln!(f, "Gate:           rejected: {}", reason)?,
            None => writeln!(f, "Gate:           accepted")?,
        }
        let views: Vec<&str> = report
            .views
            .views_detected
            .iter()
            .map(|v| v.simple_name())
            .collect();
        writeln!(f, "Views:          {}", views.join(", "))?;
        writeln!(f, "Missing Lateral: {}", report.views.missing_lateral)?;
        writeln!(f, "Duplicates:     {}", report.views.duplicates_pruned)?;
        writeln!(f, "Rotation:       {}", report.rotation_applied)?;
        writeln!(
            f,
            "Angulation:     {} ({})",
            angle(report.angulation.angulation_deg),
            report.angulation.method
        )?;
        writeln!(f)?;

        writeln!(f, "Images")?;
        writeln!(f, "------")?;
        for img in &report.images {
            let quality = report.quality.per_image.iter().find(|q| q.name == img.name);
            writeln!(f, "{}", img.name)?;
            writeln!(f, "  View: {}  Side: {}", img.view, img.side)?;
            if img.rotated {
                writeln!(f, "  Rotated: yes")?;
            }
            if img.view.is_lateral() {
                writeln!(
                    f,
                    "  Angulation: {} ({})",
                    angle(img.angulation_deg),
                    img.angulation_method
                )?;
            }
            if let Some(q) = quality {
                writeln!(f, "  Quality: {} ({:.2})", q.label, q.quality_score)?;
            }
        }

        if !report.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings")?;
            writeln!(f, "--------")?;
            for warning in &report.warnings {
                writeln!(f, "- {}", warning)?;
            }
        }

        Ok(())
    }
}

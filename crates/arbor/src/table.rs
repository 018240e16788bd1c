//! Plain column table for `arbor list`.

pub struct ListRow {
    pub branch: String,
    pub path: String,
    pub session: String,
    pub created_at: String,
    pub missing: bool,
}

pub struct TableFormatter {
    branch_width: usize,
    path_width: usize,
    session_width: usize,
}

impl TableFormatter {
    pub fn new(rows: &[ListRow]) -> Self {
        let branch_width = rows
            .iter()
            .map(|row| row.branch.len())
            .max()
            .unwrap_or(6)
            .clamp(6, 50);
        let path_width = rows
            .iter()
            .map(|row| row.path.len())
            .max()
            .unwrap_or(4)
            .clamp(4, 60);

        Self {
            branch_width,
            path_width,
            session_width: 14,
        }
    }

    pub fn print_table(&self, rows: &[ListRow]) {
        println!(
            "{:<bw$}  {:<pw$}  {:<sw$}  {}",
            "Branch",
            "Path",
            "Session",
            "Created",
            bw = self.branch_width,
            pw = self.path_width,
            sw = self.session_width,
        );
        for row in rows {
            let marker = if row.missing { " (missing)" } else { "" };
            println!(
                "{:<bw$}  {:<pw$}  {:<sw$}  {}{}",
                truncate(&row.branch, self.branch_width),
                truncate(&row.path, self.path_width),
                truncate(&row.session, self.session_width),
                row.created_at,
                marker,
                bw = self.branch_width,
                pw = self.path_width,
                sw = self.session_width,
            );
        }
    }
}

/// Truncate a string to `max` characters, ellipsizing the overflow.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{kept}...")
    }
}

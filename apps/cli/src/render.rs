use client_core::TodoRow;

const HEADERS: [&str; 4] = ["ID", "Subject", "Description", "Status"];

pub fn render_table(rows: &[TodoRow]) -> String {
    if rows.is_empty() {
        return "No todos yet.\n".to_string();
    }

    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.id.to_string(),
                single_line(&row.subject),
                single_line(&row.description),
                row.status.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|width| "-".repeat(width)), &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use shared::domain::TodoId;

    use super::*;

    fn row(id: i64, subject: &str, description: &str, status: &'static str) -> TodoRow {
        TodoRow {
            id: TodoId(id),
            subject: subject.to_string(),
            description: description.to_string(),
            status,
        }
    }

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(render_table(&[]), "No todos yet.\n");
    }

    #[test]
    fn columns_are_aligned_in_list_order() {
        let table = render_table(&[
            row(12, "Water plants", "", "Pending"),
            row(3, "Tax return", "file by\nApril", "Completed"),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ID  Subject       Description    Status");
        assert_eq!(lines[2], "12  Water plants                 Pending");
        assert_eq!(lines[3], "3   Tax return    file by April  Completed");
    }
}

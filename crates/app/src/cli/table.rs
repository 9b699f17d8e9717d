use tabled::{builder::Builder, settings::Style};

/// Render rows under `header` as a rounded table.
pub(crate) fn render<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
) -> String {
    let mut builder = Builder::default();

    builder.push_record(header);

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let table = render(["Id", "Name"], [["1".to_string(), "Milk".to_string()]]);

        assert!(table.contains("Milk"), "{table}");
        assert!(table.contains("Name"), "{table}");
        assert!(table.starts_with('╭'), "{table}");
    }
}

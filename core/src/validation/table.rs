use crate::fields::{ColumnDefinition, ColumnType, FieldDefinition};

use super::options::is_one_of_options;

pub fn validate_table(field: &FieldDefinition, rows: &[Vec<String>]) -> Result<(), String> {
    if let Some(minimum) = field.minimum_rows {
        if field.required && rows.len() < minimum {
            return Err(format!("table has {} rows, minimum is {minimum}", rows.len()));
        }
    }
    if !field.add_more_rows {
        if let Some(minimum) = field.minimum_rows {
            if rows.len() > minimum {
                return Err(format!("table has {} rows, rows cannot be added", rows.len()));
            }
        }
    } else if let Some(maximum) = field.maximum_rows {
        if rows.len() > maximum {
            return Err(format!("table has {} rows, maximum is {maximum}", rows.len()));
        }
    }

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != field.columns.len() {
            return Err(format!(
                "row {row_index} has {} cells, table has {} columns",
                row.len(),
                field.columns.len()
            ));
        }
        // Optional tables are submitted with their empty starter rows.
        if !field.required && row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        for (column_index, (cell, column)) in row.iter().zip(&field.columns).enumerate() {
            validate_cell(column, cell)
                .map_err(|reason| format!("row {row_index} column {column_index}: {reason}"))?;
        }
    }
    Ok(())
}

fn validate_cell(column: &ColumnDefinition, cell: &str) -> Result<(), String> {
    if cell.trim().is_empty() {
        return if column.required {
            Err("cell is required".to_string())
        } else {
            Ok(())
        };
    }
    match column.column_type {
        ColumnType::ShortText => Ok(()),
        ColumnType::Dropdown if is_one_of_options(&column.field_options, cell) => Ok(()),
        ColumnType::Dropdown => Err("cell is not a valid dropdown option".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::BasicField;

    fn table_field() -> FieldDefinition {
        let mut field = FieldDefinition::new("t1", BasicField::Table);
        field.columns = vec![
            ColumnDefinition {
                title: "Name".to_string(),
                required: true,
                column_type: ColumnType::ShortText,
                field_options: Vec::new(),
            },
            ColumnDefinition {
                title: "Size".to_string(),
                required: false,
                column_type: ColumnType::Dropdown,
                field_options: vec!["S".to_string(), "M".to_string()],
            },
        ];
        field.minimum_rows = Some(1);
        field.add_more_rows = true;
        field.maximum_rows = Some(3);
        field
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn accepts_well_formed_rows() {
        let rows = vec![row(&["a", "S"]), row(&["b", ""])];
        assert!(validate_table(&table_field(), &rows).is_ok());
    }

    #[test]
    fn cell_count_must_match_columns() {
        let rows = vec![row(&["a", "S", "extra"])];
        assert!(validate_table(&table_field(), &rows).is_err());
        let rows = vec![row(&["a"])];
        assert!(validate_table(&table_field(), &rows).is_err());
    }

    #[test]
    fn cells_follow_column_rules() {
        assert!(validate_table(&table_field(), &[row(&["", "S"])]).is_err());
        assert!(validate_table(&table_field(), &[row(&["a", "XL"])]).is_err());
    }

    #[test]
    fn row_count_limits() {
        let rows: Vec<Vec<String>> = (0..4).map(|_| row(&["a", "M"])).collect();
        assert!(validate_table(&table_field(), &rows).is_err());

        let mut fixed = table_field();
        fixed.add_more_rows = false;
        fixed.minimum_rows = Some(2);
        assert!(validate_table(&fixed, &[row(&["a", "M"])]).is_err());
        assert!(validate_table(&fixed, &[row(&["a", "M"]), row(&["b", "S"])]).is_ok());
        assert!(
            validate_table(&fixed, &[row(&["a", "M"]), row(&["b", "S"]), row(&["c", "S"])])
                .is_err()
        );
    }

    #[test]
    fn optional_table_allows_blank_rows_but_not_extra_cells() {
        let mut field = table_field();
        field.required = false;
        assert!(validate_table(&field, &[row(&["", ""]), row(&[" ", ""])]).is_ok());
        assert!(validate_table(&field, &[row(&[" ", " ", " "])]).is_err());
        assert!(validate_table(&field, &[row(&["", "XL"])]).is_err());
    }
}

use crate::Utils::plots::SurfaceGrid;
use csv::Writer;
use std::fs::File;
use std::io;
use std::path::Path;

/// Writes the sampled surface as a table: the first row holds the y nodes, every
/// following row an x node and the values along it. Undefined points are left empty.
pub fn save_surface_to_csv(grid: &SurfaceGrid, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);

    // Prepare and write headers
    let mut headers = Vec::with_capacity(grid.ys.len() + 1);
    headers.push("x\\y".to_string());
    headers.extend(grid.ys.iter().map(|y| y.to_string()));
    writer.write_record(&headers)?;

    // Write data rows
    for (i, row) in grid.z.row_iter().enumerate() {
        let mut row_data = Vec::with_capacity(row.len() + 1);
        row_data.push(grid.xs[i].to_string());
        row_data.extend(row.iter().map(|&val| {
            if val == 0.0 {
                // no "-0"
                "0".to_string()
            } else if val.is_finite() {
                val.to_string()
            } else {
                String::new()
            }
        }));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}

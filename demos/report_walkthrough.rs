use sales_report_builder::{derive_view, write_csv, Session, View, ViewResult, ITEM_SALES_EXPORT};
use std::path::Path;

const SAMPLE: &str = "\
Date,Particulars,Item Name,Quantity,Amount
1-Apr-2024,Sharma Traders,A4 Paper Ream,10,2500
01/04/2024,Sharma Traders,Gel Pen (Blue),50,500
15/04/2024,Metro Stationers,A4 Paper Ream,4,1000
03/05/2024,Metro Stationers,Stapler,2,360
02/06/2024,Sharma Traders,Stapler,1,180
";

fn main() -> anyhow::Result<()> {
    // Acts as the UI host: optional CSV path and view id on the command line.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (bytes, filename) = match args.first() {
        Some(path) => (std::fs::read(path)?, path.clone()),
        None => (SAMPLE.as_bytes().to_vec(), "sample_register.csv".to_string()),
    };

    let mut session = Session::new();
    let outcome = session.ingest(&bytes, &filename)?;
    println!("Upload '{}': {:?}", filename, outcome);

    let views = match args.get(1) {
        Some(id) => vec![id.parse::<View>()?],
        None => View::ALL.to_vec(),
    };

    for view in views {
        println!("\n== {} ==", view.label());
        match derive_view(&mut session, view)? {
            ViewResult::Empty => println!("(no data loaded)"),
            ViewResult::Table { table } => {
                println!("{}", table.columns().join(" | "));
                for row in table.rows() {
                    let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                    println!("{}", cells.join(" | "));
                }
            }
            ViewResult::Chart { table, total, hint } => {
                println!("{:?}", hint);
                for row in table.rows() {
                    println!(" - {:<20} {:>12.2}", row[0].to_string(), row[1].to_string().parse::<f64>()?);
                }
                println!("   {:<20} {:>12.2}", "Total", total);
                if view == View::ItemWiseSales {
                    write_csv(&table, Path::new(ITEM_SALES_EXPORT))?;
                    println!("Item-wise sales report saved as {}", ITEM_SALES_EXPORT);
                }
            }
            ViewResult::History { entries } => {
                for entry in entries {
                    println!(
                        "Timestamp: {}, Filename: {} ({} rows)",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.filename,
                        entry.rows
                    );
                }
            }
        }
    }

    Ok(())
}

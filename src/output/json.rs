use crate::model::TrustReport;
use anyhow::Result;

pub fn print_json(report: &TrustReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

//! CSV report generation

use crate::report::Report;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    match report {
        Report::Encode(r) => {
            writeln!(
                writer,
                "operation,input,output,secret_name,width,encrypted,random_order,bits_written,capacity_bits,psnr_db,quality"
            )?;

            let psnr = r
                .psnr_db
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "inf".to_string());

            writeln!(
                writer,
                "encode,{},{},{},{},{},{},{},{},{},{}",
                escape_csv(&r.input),
                escape_csv(&r.output),
                escape_csv(&r.secret_name),
                r.width,
                r.encrypted,
                r.random_order,
                r.bits_written,
                r.capacity_bits,
                psnr,
                escape_csv(&r.quality)
            )
        }
        Report::Decode(r) => {
            writeln!(writer, "operation,input,output,name,ext,size,width,random_order,encrypted")?;
            writeln!(
                writer,
                "decode,{},{},{},{},{},{},{},{}",
                escape_csv(&r.input),
                escape_csv(&r.output),
                escape_csv(&r.name),
                escape_csv(&r.ext),
                r.size,
                r.width,
                r.random_order,
                r.encrypted
            )
        }
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

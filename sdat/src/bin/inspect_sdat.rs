//! Prints the tables of the SDAT archive on stdin.
use sdat::{SdatReader, SymbolCategory};
use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut data = Vec::new();
    std::io::stdin().read_to_end(&mut data)?;
    let sdat = SdatReader::all().read(data)?;

    println!("{} files", sdat.files().len());

    println!("sequences:");
    for (index, seq) in sdat.sequences().iter().enumerate() {
        if let Some(seq) = seq {
            let name = sdat.name_of(SymbolCategory::Sequence, index).unwrap_or("-");
            println!("  {:4} {:24} {:x?}", index, name, seq);
        }
    }

    println!("streams:");
    for (index, info) in sdat.streams().iter().enumerate() {
        if info.is_none() {
            continue;
        }
        let name = sdat.name_of(SymbolCategory::Stream, index).unwrap_or("-");
        match sdat.open_stream(index) {
            Ok(strm) => println!(
                "  {:4} {:24} {:?} {}ch {}Hz {} samples, {:?}{}",
                index,
                name,
                strm.encoding,
                strm.channels,
                strm.sample_rate,
                strm.total_samples,
                strm.duration(),
                if strm.loops { " (loops)" } else { "" },
            ),
            Err(err) => println!("  {:4} {:24} error: {}", index, name, err),
        }
    }

    Ok(())
}

use std::env;
use std::error::Error;
use std::fs;
use xmlite_sax::EventReader;

fn main() -> Result<(), Box<dyn Error>> {
    let file_path = env::args().nth(1).ok_or("Missing file path")?;
    let contents = fs::read_to_string(file_path)?;
    for event in EventReader::new(&contents) {
        println!("{:?}", event?);
    }
    Ok(())
}

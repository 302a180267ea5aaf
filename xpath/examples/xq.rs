use std::env;
use std::error::Error;
use std::fs;
use xmlite_tree::{XmlDocument, XmlItem};

fn main() -> Result<(), Box<dyn Error>> {
    let file_path = env::args().nth(1).ok_or("Missing file path")?;
    let path = env::args().nth(2).ok_or("Missing query")?;
    let contents = fs::read_to_string(file_path)?;

    let document = XmlItem::Document(XmlDocument::from_text(&contents)?);
    for item in xmlite_xpath::query(&document, &path)? {
        println!("{}", item);
    }

    Ok(())
}

use std::env;
use std::error::Error;
use std::fs;
use xmlite_tree::{XmlDocument, XmlItem};

fn main() -> Result<(), Box<dyn Error>> {
    let file_path = env::args().nth(1).ok_or("Missing file path")?;
    let contents = fs::read_to_string(file_path)?;
    let document = XmlDocument::from_text(&contents)?;

    let item = XmlItem::Document(document);
    for descendant in item.flattened_children() {
        if let Some(path) = descendant.xpath() {
            println!("{} (level {})", path, descendant.level());
        }
    }

    Ok(())
}

use crate::error::{self, Error};
use crate::{IndexPath, NodeRef, XmlAttribute, XmlDocument, XmlElement, XmlItem};
use xmlite_sax::model::{Attribute, XmlEvent};

// -----------------------------------------------------------------------------------------------

/// Grows a document from an ordered event stream.
///
/// The builder never buffers or reorders: each event is applied as it
/// arrives, with `cursor` addressing the element open for insertion (an
/// empty path addresses the document itself). `node_open` gates character
/// data so that text following a closed child is dropped rather than
/// attributed to the wrong element.
pub struct TreeBuilder {
    document: NodeRef<XmlDocument>,
    cursor: IndexPath,
    node_open: bool,
    completed: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            document: XmlDocument::new(),
            cursor: IndexPath::new(),
            node_open: false,
            completed: false,
        }
    }

    pub fn handle_event(&mut self, event: XmlEvent) -> error::Result<()> {
        match event {
            XmlEvent::StartDocument => {
                self.document = XmlDocument::new();
                self.cursor = IndexPath::new();
                self.node_open = false;
                self.completed = false;
                Ok(())
            }
            XmlEvent::StartElement { name, attributes } => self.start_element(&name, attributes),
            XmlEvent::Characters(value) => {
                self.characters(&value);
                Ok(())
            }
            XmlEvent::EndElement { name } => self.end_element(&name),
            XmlEvent::EndDocument => {
                self.completed = true;
                Ok(())
            }
        }
    }

    /// The completed document, or `UnexpectedEndOfStream` when the event
    /// sequence ended without a terminal event.
    pub fn finish(self) -> error::Result<NodeRef<XmlDocument>> {
        if self.completed {
            Ok(self.document)
        } else {
            Err(Error::UnexpectedEndOfStream)
        }
    }

    fn start_element(&mut self, name: &str, attributes: Vec<Attribute>) -> error::Result<()> {
        let element = XmlElement::new(name);
        for attribute in attributes {
            XmlElement::push_attribute(
                &element,
                XmlAttribute::new(&attribute.name, &attribute.value),
            );
        }

        let document = self.item();
        let parent = document
            .node_at(&self.cursor)
            .ok_or(Error::MalformedDocument)?;
        parent.append_child(XmlItem::Element(element))?;

        let index = match parent.children() {
            Some(children) => children.len() - 1,
            None => return Err(Error::MalformedDocument),
        };
        self.cursor.push(index);
        self.node_open = true;
        Ok(())
    }

    fn characters(&mut self, value: &str) {
        if !self.node_open {
            return;
        }

        if let Some(XmlItem::Element(element)) = self.item().node_at(&self.cursor) {
            element.borrow_mut().append_string_value(value);
        }
    }

    /// Pops the cursor back to the parent of the nearest enclosing element
    /// with a matching name. Mismatched names skip levels one at a time; a
    /// cursor exhausted without a match is a structural inconsistency.
    fn end_element(&mut self, name: &str) -> error::Result<()> {
        self.node_open = false;

        let document = self.item();
        let mut probe = self.cursor.clone();
        while !probe.is_empty() {
            let matched = document
                .node_at(&probe)
                .and_then(|v| v.name())
                .is_some_and(|v| v == name);
            if matched {
                probe.pop();
                self.cursor = probe;
                return Ok(());
            }
            probe.pop();
        }

        Err(Error::MalformedDocument)
    }

    fn item(&self) -> XmlItem {
        XmlItem::Document(self.document.clone())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

// -----------------------------------------------------------------------------------------------

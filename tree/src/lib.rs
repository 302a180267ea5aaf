pub mod builder;
pub mod error;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use error::Error;

// -----------------------------------------------------------------------------------------------

pub type NodeRef<T> = Rc<RefCell<T>>;

fn node<T>(value: T) -> NodeRef<T> {
    Rc::new(RefCell::new(value))
}

// -----------------------------------------------------------------------------------------------

/// Ordered sequence of child indices addressing a node from a fixed root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexPath {
    indexes: Vec<usize>,
}

impl IndexPath {
    pub fn new() -> Self {
        IndexPath::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn push(&mut self, index: usize) {
        self.indexes.push(index);
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.indexes.pop()
    }

    pub fn as_slice(&self) -> &[usize] {
        self.indexes.as_slice()
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(value: Vec<usize>) -> Self {
        IndexPath { indexes: value }
    }
}

// -----------------------------------------------------------------------------------------------

/// Non-owning back-reference to the node that owns a child.
#[derive(Clone, Debug)]
enum ParentRef {
    Document(Weak<RefCell<XmlDocument>>),
    Element(Weak<RefCell<XmlElement>>),
}

impl ParentRef {
    fn upgrade(&self) -> Option<XmlItem> {
        match self {
            ParentRef::Document(v) => v.upgrade().map(XmlItem::Document),
            ParentRef::Element(v) => v.upgrade().map(XmlItem::Element),
        }
    }
}

// -----------------------------------------------------------------------------------------------

/// Any addressable unit of the tree.
#[derive(Clone, Debug)]
pub enum XmlItem {
    Document(NodeRef<XmlDocument>),
    Element(NodeRef<XmlElement>),
    Attribute(NodeRef<XmlAttribute>),
}

impl XmlItem {
    pub fn name(&self) -> Option<String> {
        match self {
            XmlItem::Document(_) => None,
            XmlItem::Element(v) => Some(v.borrow().name.clone()),
            XmlItem::Attribute(v) => Some(v.borrow().name.clone()),
        }
    }

    pub fn string_value(&self) -> Option<String> {
        match self {
            XmlItem::Document(_) => None,
            XmlItem::Element(v) => v.borrow().string_value.clone(),
            XmlItem::Attribute(v) => Some(v.borrow().string_value.clone()),
        }
    }

    pub fn parent(&self) -> Option<XmlItem> {
        match self {
            XmlItem::Document(_) => None,
            XmlItem::Element(v) => v.borrow().parent.as_ref().and_then(ParentRef::upgrade),
            XmlItem::Attribute(v) => v
                .borrow()
                .parent
                .as_ref()
                .and_then(Weak::upgrade)
                .map(XmlItem::Element),
        }
    }

    /// Owned children, `None` for attributes.
    pub fn children(&self) -> Option<Vec<XmlItem>> {
        match self {
            XmlItem::Document(v) => Some(v.borrow().children.clone()),
            XmlItem::Element(v) => Some(v.borrow().children.clone()),
            XmlItem::Attribute(_) => None,
        }
    }

    /// Direct children with the given name.
    pub fn children_named(&self, name: &str) -> Vec<XmlItem> {
        self.children()
            .unwrap_or_default()
            .into_iter()
            .filter(|v| v.name().as_deref() == Some(name))
            .collect()
    }

    /// Attributes of an element, empty for other nodes.
    pub fn attributes(&self) -> Vec<NodeRef<XmlAttribute>> {
        match self {
            XmlItem::Element(v) => v.borrow().attributes.clone(),
            _ => vec![],
        }
    }

    /// First attribute with the given name (elements only).
    pub fn attribute(&self, name: &str) -> Option<NodeRef<XmlAttribute>> {
        match self {
            XmlItem::Element(v) => v.borrow().attribute(name),
            _ => None,
        }
    }

    /// Document at the top of the parent chain, if attached beneath one.
    pub fn root_document(&self) -> Option<NodeRef<XmlDocument>> {
        let mut current = self.parent()?;
        loop {
            match current {
                XmlItem::Document(v) => return Some(v),
                _ => current = current.parent()?,
            }
        }
    }

    /// Nesting depth beneath the root element; the document layer is skipped,
    /// so the document and the root element are both level 0.
    pub fn level(&self) -> usize {
        let mut level = 0;
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            if matches!(parent, XmlItem::Document(_)) {
                break;
            }
            level += 1;
            current = parent;
        }
        level
    }

    /// Absolute `/name1/name2/...` path of an element attached beneath a
    /// document; `None` for other nodes or detached elements.
    pub fn xpath(&self) -> Option<String> {
        if !matches!(self, XmlItem::Element(_)) {
            return None;
        }

        let mut names = vec![];
        let mut current = self.clone();
        loop {
            match &current {
                XmlItem::Document(_) => break,
                XmlItem::Element(v) => names.push(v.borrow().name.clone()),
                XmlItem::Attribute(_) => return None,
            }

            current = current.parent()?;
        }

        names.reverse();
        Some(format!("/{}", names.join("/")))
    }

    /// All descendants in document order (pre-order, depth-first).
    ///
    /// Walked with an explicit stack so adversarial nesting depth cannot
    /// overflow the call stack.
    pub fn flattened_children(&self) -> Vec<XmlItem> {
        let mut nodes = vec![];

        let mut stack: Vec<XmlItem> = match self.children() {
            Some(children) => children.into_iter().rev().collect(),
            None => return nodes,
        };

        while let Some(item) = stack.pop() {
            if let Some(children) = item.children() {
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }
            nodes.push(item);
        }

        nodes
    }

    pub fn as_document(&self) -> Option<NodeRef<XmlDocument>> {
        if let XmlItem::Document(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_element(&self) -> Option<NodeRef<XmlElement>> {
        if let XmlItem::Element(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    pub fn as_attribute(&self) -> Option<NodeRef<XmlAttribute>> {
        if let XmlItem::Attribute(v) = self {
            Some(v.clone())
        } else {
            None
        }
    }

    /// Identity comparison; `PartialEq` compares structure.
    pub fn ptr_eq(&self, other: &XmlItem) -> bool {
        match (self, other) {
            (XmlItem::Document(a), XmlItem::Document(b)) => Rc::ptr_eq(a, b),
            (XmlItem::Element(a), XmlItem::Element(b)) => Rc::ptr_eq(a, b),
            (XmlItem::Attribute(a), XmlItem::Attribute(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------------------------
// Mutation engine.

impl XmlItem {
    /// Node addressed by walking `path` down from this node; `None` when any
    /// step is out of range or descends through an attribute.
    pub fn node_at(&self, path: &IndexPath) -> Option<XmlItem> {
        let mut current = self.clone();
        for &index in path.as_slice() {
            let children = current.children()?;
            current = children.get(index)?.clone();
        }
        Some(current)
    }

    /// Inserts `child` at `index`, shifting subsequent siblings right.
    ///
    /// A node owned elsewhere is detached from its previous parent first;
    /// ownership is never duplicated.
    pub fn insert_child(&self, index: usize, child: XmlItem) -> error::Result<()> {
        match &child {
            XmlItem::Document(_) => return Err(Error::Structure("document cannot be a child")),
            XmlItem::Attribute(_) => return Err(Error::Structure("attribute cannot be a child")),
            XmlItem::Element(_) => {}
        }

        let len = match self {
            XmlItem::Document(v) => v.borrow().children.len(),
            XmlItem::Element(v) => v.borrow().children.len(),
            XmlItem::Attribute(_) => {
                return Err(Error::Structure("attribute cannot own children"))
            }
        };
        if index > len {
            return Err(Error::IndexOutOfBounds);
        }

        if let XmlItem::Document(document) = self {
            let occupied = document
                .borrow()
                .children
                .iter()
                .any(|v| matches!(v, XmlItem::Element(_)) && !v.ptr_eq(&child));
            if occupied {
                return Err(Error::Structure("multiple root elements"));
            }
        }

        let mut ancestor = Some(self.clone());
        while let Some(current) = ancestor {
            if current.ptr_eq(&child) {
                return Err(Error::Structure("insertion would create a cycle"));
            }
            ancestor = current.parent();
        }

        child.detach();

        match self {
            XmlItem::Document(document) => {
                let index = index.min(document.borrow().children.len());
                if let XmlItem::Element(v) = &child {
                    v.borrow_mut().parent = Some(ParentRef::Document(Rc::downgrade(document)));
                }
                document.borrow_mut().children.insert(index, child);
                Ok(())
            }
            XmlItem::Element(element) => {
                let index = index.min(element.borrow().children.len());
                if let XmlItem::Element(v) = &child {
                    v.borrow_mut().parent = Some(ParentRef::Element(Rc::downgrade(element)));
                }
                element.borrow_mut().children.insert(index, child);
                Ok(())
            }
            XmlItem::Attribute(_) => Err(Error::Structure("attribute cannot own children")),
        }
    }

    /// Inserts `child` after the current last child.
    pub fn append_child(&self, child: XmlItem) -> error::Result<()> {
        let len = self.children().map(|v| v.len()).unwrap_or(0);
        self.insert_child(len, child)
    }

    /// Removes and returns the child at `index`, clearing its parent
    /// back-reference and shifting subsequent siblings left.
    pub fn remove_child(&self, index: usize) -> error::Result<XmlItem> {
        let removed = match self {
            XmlItem::Document(v) => {
                if index >= v.borrow().children.len() {
                    return Err(Error::IndexOutOfBounds);
                }
                v.borrow_mut().children.remove(index)
            }
            XmlItem::Element(v) => {
                if index >= v.borrow().children.len() {
                    return Err(Error::IndexOutOfBounds);
                }
                v.borrow_mut().children.remove(index)
            }
            XmlItem::Attribute(_) => return Err(Error::IndexOutOfBounds),
        };

        clear_parent(&removed);
        Ok(removed)
    }

    /// `insert_child` on the node addressed by `parent`.
    pub fn insert_child_at(
        &self,
        parent: &IndexPath,
        index: usize,
        child: XmlItem,
    ) -> error::Result<()> {
        let parent = self.node_at(parent).ok_or(Error::IndexOutOfBounds)?;
        parent.insert_child(index, child)
    }

    /// `append_child` on the node addressed by `parent`.
    pub fn append_child_at(&self, parent: &IndexPath, child: XmlItem) -> error::Result<()> {
        let parent = self.node_at(parent).ok_or(Error::IndexOutOfBounds)?;
        parent.append_child(child)
    }

    /// `remove_child` on the node addressed by `parent`.
    pub fn remove_child_at(&self, parent: &IndexPath, index: usize) -> error::Result<XmlItem> {
        let parent = self.node_at(parent).ok_or(Error::IndexOutOfBounds)?;
        parent.remove_child(index)
    }

    /// Removes this node from its current parent, if any.
    pub fn detach(&self) {
        let parent = match self {
            XmlItem::Document(_) => None,
            XmlItem::Element(v) => {
                let parent = v.borrow().parent.clone();
                parent.as_ref().and_then(ParentRef::upgrade)
            }
            XmlItem::Attribute(v) => {
                let parent = v.borrow().parent.clone();
                parent.as_ref().and_then(Weak::upgrade).map(XmlItem::Element)
            }
        };

        if let Some(parent) = parent.as_ref() {
            match (parent, self) {
                (XmlItem::Element(owner), XmlItem::Attribute(attribute)) => owner
                    .borrow_mut()
                    .attributes
                    .retain(|v| !Rc::ptr_eq(v, attribute)),
                (XmlItem::Document(owner), _) => {
                    owner.borrow_mut().children.retain(|v| !v.ptr_eq(self))
                }
                (XmlItem::Element(owner), _) => {
                    owner.borrow_mut().children.retain(|v| !v.ptr_eq(self))
                }
                _ => {}
            }
        }

        clear_parent(self);
    }
}

fn clear_parent(item: &XmlItem) {
    match item {
        XmlItem::Document(_) => {}
        XmlItem::Element(v) => v.borrow_mut().parent = None,
        XmlItem::Attribute(v) => v.borrow_mut().parent = None,
    }
}

impl PartialEq for XmlItem {
    fn eq(&self, other: &XmlItem) -> bool {
        match (self, other) {
            (XmlItem::Document(a), XmlItem::Document(b)) => *a.borrow() == *b.borrow(),
            (XmlItem::Element(a), XmlItem::Element(b)) => *a.borrow() == *b.borrow(),
            (XmlItem::Attribute(a), XmlItem::Attribute(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl fmt::Display for XmlItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            XmlItem::Document(v) => v.borrow().fmt(f),
            XmlItem::Element(v) => v.borrow().fmt(f),
            XmlItem::Attribute(v) => v.borrow().fmt(f),
        }
    }
}

impl From<NodeRef<XmlDocument>> for XmlItem {
    fn from(value: NodeRef<XmlDocument>) -> Self {
        XmlItem::Document(value)
    }
}

impl From<NodeRef<XmlElement>> for XmlItem {
    fn from(value: NodeRef<XmlElement>) -> Self {
        XmlItem::Element(value)
    }
}

impl From<NodeRef<XmlAttribute>> for XmlItem {
    fn from(value: NodeRef<XmlAttribute>) -> Self {
        XmlItem::Attribute(value)
    }
}

// -----------------------------------------------------------------------------------------------

/// Document root; owns at most one element.
#[derive(Debug, Default)]
pub struct XmlDocument {
    children: Vec<XmlItem>,
}

impl XmlDocument {
    pub fn new() -> NodeRef<Self> {
        node(XmlDocument::default())
    }

    /// Builds a document from XML text by streaming tokenizer events through
    /// a [`builder::TreeBuilder`]. All-or-nothing: a failed parse never
    /// yields a partial tree.
    pub fn from_text(text: &str) -> error::Result<NodeRef<Self>> {
        let mut tree = builder::TreeBuilder::new();
        for event in xmlite_sax::EventReader::new(text) {
            tree.handle_event(event?)?;
        }
        tree.finish()
    }

    /// `from_text` over UTF-8 bytes.
    pub fn from_bytes(bytes: &[u8]) -> error::Result<NodeRef<Self>> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            let consumed = &bytes[..e.valid_up_to()];
            let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
            let tail = match consumed.iter().rposition(|&b| b == b'\n') {
                Some(index) => &consumed[index + 1..],
                None => consumed,
            };
            let column = match std::str::from_utf8(tail) {
                Ok(v) => v.chars().count() + 1,
                Err(_) => tail.len() + 1,
            };
            Error::Parse { line, column }
        })?;

        Self::from_text(text)
    }

    pub fn children(&self) -> Vec<XmlItem> {
        self.children.clone()
    }

    pub fn root_element(&self) -> Option<NodeRef<XmlElement>> {
        self.children.iter().find_map(XmlItem::as_element)
    }
}

impl PartialEq for XmlDocument {
    fn eq(&self, other: &XmlDocument) -> bool {
        self.children == other.children
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for child in self.children.as_slice() {
            child.fmt(f)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------------------------

/// Named element with scalar text content, attributes, and child elements.
///
/// Text content is a property of the element, not a child node; mixed
/// content collapses into one accumulated string.
#[derive(Debug)]
pub struct XmlElement {
    name: String,
    string_value: Option<String>,
    attributes: Vec<NodeRef<XmlAttribute>>,
    children: Vec<XmlItem>,
    parent: Option<ParentRef>,
}

impl XmlElement {
    pub fn new(name: &str) -> NodeRef<Self> {
        node(XmlElement {
            name: name.to_string(),
            string_value: None,
            attributes: vec![],
            children: vec![],
            parent: None,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn string_value(&self) -> Option<&str> {
        self.string_value.as_deref()
    }

    pub fn set_string_value(&mut self, value: &str) {
        self.string_value = Some(value.to_string());
    }

    pub fn append_string_value(&mut self, value: &str) {
        match self.string_value.as_mut() {
            Some(v) => v.push_str(value),
            None => self.string_value = Some(value.to_string()),
        }
    }

    pub fn children(&self) -> Vec<XmlItem> {
        self.children.clone()
    }

    pub fn attributes(&self) -> Vec<NodeRef<XmlAttribute>> {
        self.attributes.clone()
    }

    pub fn attribute(&self, name: &str) -> Option<NodeRef<XmlAttribute>> {
        self.attributes
            .iter()
            .find(|v| v.borrow().name == name)
            .cloned()
    }

    /// Attaches `attribute`, taking it over from any previous owner. The
    /// element handle is needed for the weak back-reference.
    pub fn push_attribute(element: &NodeRef<Self>, attribute: NodeRef<XmlAttribute>) {
        XmlItem::Attribute(attribute.clone()).detach();
        attribute.borrow_mut().parent = Some(Rc::downgrade(element));
        element.borrow_mut().attributes.push(attribute);
    }

    /// Replaces the whole attribute list, clearing old back-references.
    pub fn set_attributes(element: &NodeRef<Self>, attributes: Vec<NodeRef<XmlAttribute>>) {
        let old = std::mem::take(&mut element.borrow_mut().attributes);
        for attribute in old {
            attribute.borrow_mut().parent = None;
        }

        for attribute in attributes {
            Self::push_attribute(element, attribute);
        }
    }
}

impl PartialEq for XmlElement {
    fn eq(&self, other: &XmlElement) -> bool {
        self.name == other.name
            && self.string_value == other.string_value
            && self.attributes == other.attributes
            && self.children == other.children
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "<{}", self.name.as_str())?;

        for attribute in self.attributes.as_slice() {
            write!(f, " {}", attribute.borrow())?;
        }

        if self.string_value.is_none() && self.children.is_empty() {
            write!(f, " />")
        } else {
            write!(f, ">")?;

            if let Some(value) = self.string_value.as_deref() {
                escape_text(value, f)?;
            }

            for child in self.children.as_slice() {
                child.fmt(f)?;
            }

            write!(f, "</{}>", self.name.as_str())
        }
    }
}

// -----------------------------------------------------------------------------------------------

/// Leaf name/value pair owned by an element.
#[derive(Debug)]
pub struct XmlAttribute {
    name: String,
    string_value: String,
    parent: Option<Weak<RefCell<XmlElement>>>,
}

impl XmlAttribute {
    pub fn new(name: &str, value: &str) -> NodeRef<Self> {
        node(XmlAttribute {
            name: name.to_string(),
            string_value: value.to_string(),
            parent: None,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn string_value(&self) -> &str {
        self.string_value.as_str()
    }

    pub fn set_string_value(&mut self, value: &str) {
        self.string_value = value.to_string();
    }

    pub fn owner_element(&self) -> Option<NodeRef<XmlElement>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

impl PartialEq for XmlAttribute {
    fn eq(&self, other: &XmlAttribute) -> bool {
        self.name == other.name && self.string_value == other.string_value
    }
}

impl fmt::Display for XmlAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}=\"", self.name.as_str())?;
        escape_attribute(self.string_value.as_str(), f)?;
        write!(f, "\"")
    }
}

// -----------------------------------------------------------------------------------------------

fn escape_text(value: &str, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for c in value.chars() {
        match c {
            '<' => write!(f, "&lt;")?,
            '&' => write!(f, "&amp;")?,
            _ => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

fn escape_attribute(value: &str, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for c in value.chars() {
        match c {
            '<' => write!(f, "&lt;")?,
            '&' => write!(f, "&amp;")?,
            '"' => write!(f, "&quot;")?,
            _ => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> NodeRef<XmlDocument> {
        XmlDocument::from_text(text).unwrap()
    }

    #[test]
    fn test_from_text_note() {
        let doc = document(
            "<note><to>Tove</to><from>Jani</from><heading>Reminder</heading><body>Don't forget me this weekend!</body></note>",
        );

        let children = doc.borrow().children();
        assert_eq!(1, children.len());
        assert_eq!(Some("note".to_string()), children[0].name());

        let note = &children[0];
        let note_children = note.children().unwrap();
        assert_eq!(4, note_children.len());
        assert_eq!(Some("Tove".to_string()), note_children[0].string_value());
        assert_eq!(
            Some("Don't forget me this weekend!".to_string()),
            note_children[3].string_value()
        );
    }

    #[test]
    fn test_from_bytes_invalid_utf8() {
        let err = XmlDocument::from_bytes(b"<a>\xFF</a>").err().unwrap();
        assert_eq!(Error::Parse { line: 1, column: 4 }, err);
    }

    #[test]
    fn test_from_text_unmatched_end() {
        let err = XmlDocument::from_text("<a></b>").err().unwrap();
        assert_eq!(Error::MalformedDocument, err);
    }

    #[test]
    fn test_from_text_never_partial() {
        // Walk-up recovery lets </a> close the outer element, after which the
        // stream ends without a terminal event.
        let err = XmlDocument::from_text("<a><b></a>").err().unwrap();
        assert_eq!(Error::UnexpectedEndOfStream, err);
    }

    #[test]
    fn test_root_element() {
        let doc = document("<a><b/></a>");
        let root = doc.borrow().root_element().unwrap();
        assert_eq!("a", root.borrow().name());
    }

    #[test]
    fn test_single_root_invariant() {
        let doc = document("<a/>");
        let item = XmlItem::Document(doc);

        let second = XmlElement::new("b");
        let err = item.append_child(XmlItem::Element(second)).err().unwrap();
        assert_eq!(Error::Structure("multiple root elements"), err);

        let children = item.children().unwrap();
        assert_eq!(1, children.len());
    }

    #[test]
    fn test_insert_child_bounds() {
        let root = XmlElement::new("root");
        let item = XmlItem::Element(root);

        let err = item
            .insert_child(1, XmlItem::Element(XmlElement::new("a")))
            .err()
            .unwrap();
        assert_eq!(Error::IndexOutOfBounds, err);

        item.insert_child(0, XmlItem::Element(XmlElement::new("a")))
            .unwrap();
        item.insert_child(0, XmlItem::Element(XmlElement::new("b")))
            .unwrap();

        let names: Vec<_> = item
            .children()
            .unwrap()
            .iter()
            .map(|v| v.name().unwrap())
            .collect();
        assert_eq!(vec!["b", "a"], names);
    }

    #[test]
    fn test_remove_child_twice() {
        let doc = document("<a><b/><c/></a>");
        let item = XmlItem::Document(doc);
        let root = item.children().unwrap().remove(0);

        let removed = root.remove_child(1).unwrap();
        assert_eq!(Some("c".to_string()), removed.name());
        assert!(removed.parent().is_none());

        let err = root.remove_child(1).err().unwrap();
        assert_eq!(Error::IndexOutOfBounds, err);

        let names: Vec<_> = root
            .children()
            .unwrap()
            .iter()
            .map(|v| v.name().unwrap())
            .collect();
        assert_eq!(vec!["b"], names);
    }

    #[test]
    fn test_reparenting_detaches() {
        let doc = document("<a><b><c/></b><d/></a>");
        let item = XmlItem::Document(doc);
        let root = item.children().unwrap().remove(0);
        let b = root.node_at(&IndexPath::from(vec![0])).unwrap();
        let c = root.node_at(&IndexPath::from(vec![0, 0])).unwrap();
        let d = root.node_at(&IndexPath::from(vec![1])).unwrap();

        d.append_child(c.clone()).unwrap();

        assert!(b.children().unwrap().is_empty());
        assert!(c.parent().unwrap().ptr_eq(&d));
        assert_eq!(1, d.children().unwrap().len());
    }

    #[test]
    fn test_insert_cycle_guard() {
        let doc = document("<a><b><c/></b></a>");
        let item = XmlItem::Document(doc);
        let b = item.node_at(&IndexPath::from(vec![0, 0])).unwrap();
        let c = item.node_at(&IndexPath::from(vec![0, 0, 0])).unwrap();

        let err = c.append_child(b).err().unwrap();
        assert_eq!(Error::Structure("insertion would create a cycle"), err);

        let err = c.clone().append_child(c).err().unwrap();
        assert_eq!(Error::Structure("insertion would create a cycle"), err);
    }

    #[test]
    fn test_attribute_cannot_be_child() {
        let root = XmlItem::Element(XmlElement::new("root"));
        let attribute = XmlItem::Attribute(XmlAttribute::new("id", "1"));

        let err = root.append_child(attribute).err().unwrap();
        assert_eq!(Error::Structure("attribute cannot be a child"), err);
    }

    #[test]
    fn test_parent_backrefs_consistent() {
        let doc = document("<a><b/><c><d/></c></a>");
        let item = XmlItem::Document(doc);

        for descendant in item.flattened_children() {
            let parent = descendant.parent().unwrap();
            let owned = parent
                .children()
                .unwrap()
                .iter()
                .any(|v| v.ptr_eq(&descendant));
            assert!(owned);
        }
    }

    #[test]
    fn test_node_at() {
        let doc = document("<a><b/><c><d/></c></a>");
        let item = XmlItem::Document(doc);

        let d = item.node_at(&IndexPath::from(vec![0, 1, 0])).unwrap();
        assert_eq!(Some("d".to_string()), d.name());

        assert!(item.node_at(&IndexPath::from(vec![0, 2])).is_none());
        assert!(item.node_at(&IndexPath::from(vec![1])).is_none());

        let whole = item.node_at(&IndexPath::new()).unwrap();
        assert!(whole.ptr_eq(&item));
    }

    #[test]
    fn test_node_at_through_attribute() {
        let doc = document("<a id='1'/>");
        let item = XmlItem::Document(doc);
        let a = item.node_at(&IndexPath::from(vec![0])).unwrap();
        let attribute = XmlItem::Attribute(a.attribute("id").unwrap());

        assert!(attribute.node_at(&IndexPath::from(vec![0])).is_none());
        assert!(attribute.children().is_none());
    }

    #[test]
    fn test_index_path_mutation() {
        let doc = document("<a><b/></a>");
        let item = XmlItem::Document(doc);

        item.append_child_at(
            &IndexPath::from(vec![0]),
            XmlItem::Element(XmlElement::new("c")),
        )
        .unwrap();
        item.insert_child_at(
            &IndexPath::from(vec![0]),
            0,
            XmlItem::Element(XmlElement::new("z")),
        )
        .unwrap();

        let names: Vec<_> = item
            .node_at(&IndexPath::from(vec![0]))
            .unwrap()
            .children()
            .unwrap()
            .iter()
            .map(|v| v.name().unwrap())
            .collect();
        assert_eq!(vec!["z", "b", "c"], names);

        let removed = item.remove_child_at(&IndexPath::from(vec![0]), 1).unwrap();
        assert_eq!(Some("b".to_string()), removed.name());

        let err = item
            .append_child_at(&IndexPath::from(vec![9]), XmlItem::Element(XmlElement::new("x")))
            .err()
            .unwrap();
        assert_eq!(Error::IndexOutOfBounds, err);
    }

    #[test]
    fn test_level() {
        let doc = document("<a><b><c/></b></a>");
        let item = XmlItem::Document(doc);

        assert_eq!(0, item.level());
        assert_eq!(0, item.node_at(&IndexPath::from(vec![0])).unwrap().level());
        assert_eq!(
            1,
            item.node_at(&IndexPath::from(vec![0, 0])).unwrap().level()
        );
        assert_eq!(
            2,
            item.node_at(&IndexPath::from(vec![0, 0, 0]))
                .unwrap()
                .level()
        );
    }

    #[test]
    fn test_xpath_roundtrip() {
        let doc = document("<a><b><c/></b><d/></a>");
        let item = XmlItem::Document(doc);

        let paths: Vec<_> = item
            .flattened_children()
            .iter()
            .map(|v| v.xpath().unwrap())
            .collect();
        assert_eq!(vec!["/a", "/a/b", "/a/b/c", "/a/d"], paths);

        assert_eq!(None, item.xpath());
    }

    #[test]
    fn test_xpath_detached() {
        let element = XmlItem::Element(XmlElement::new("lonely"));
        assert_eq!(None, element.xpath());
    }

    #[test]
    fn test_root_document() {
        let doc = document("<a><b/></a>");
        let item = XmlItem::Document(doc.clone());
        let b = item.node_at(&IndexPath::from(vec![0, 0])).unwrap();

        assert!(Rc::ptr_eq(&b.root_document().unwrap(), &doc));
        assert!(item.root_document().is_none());

        let detached = XmlItem::Element(XmlElement::new("x"));
        assert!(detached.root_document().is_none());
    }

    #[test]
    fn test_children_named() {
        let doc = document("<a><b/><c/><b/></a>");
        let item = XmlItem::Document(doc);
        let root = item.children().unwrap().remove(0);

        assert_eq!(2, root.children_named("b").len());
        assert_eq!(1, root.children_named("c").len());
        assert!(root.children_named("x").is_empty());
    }

    #[test]
    fn test_flattened_children_document_order() {
        let doc = document("<a><b><c/><d/></b><e/></a>");
        let item = XmlItem::Document(doc);

        let names: Vec<_> = item
            .flattened_children()
            .iter()
            .map(|v| v.name().unwrap())
            .collect();
        assert_eq!(vec!["a", "b", "c", "d", "e"], names);
    }

    #[test]
    fn test_attribute_owner() {
        let doc = document("<a id='1'/>");
        let item = XmlItem::Document(doc);
        let a = item.node_at(&IndexPath::from(vec![0])).unwrap();
        let attribute = a.attribute("id").unwrap();

        assert_eq!("1", attribute.borrow().string_value());
        let owner = attribute.borrow().owner_element().unwrap();
        assert!(Rc::ptr_eq(&owner, &a.as_element().unwrap()));
    }

    #[test]
    fn test_push_attribute_moves_owner() {
        let first = XmlElement::new("first");
        let second = XmlElement::new("second");
        let attribute = XmlAttribute::new("id", "1");

        XmlElement::push_attribute(&first, attribute.clone());
        XmlElement::push_attribute(&second, attribute.clone());

        assert!(first.borrow().attributes().is_empty());
        assert_eq!(1, second.borrow().attributes().len());
        let owner = attribute.borrow().owner_element().unwrap();
        assert!(Rc::ptr_eq(&owner, &second));
    }

    #[test]
    fn test_display() {
        let doc = document("<a m=\"x&amp;y\"><b>1 &lt; 2</b><c/></a>");
        assert_eq!(
            "<a m=\"x&amp;y\"><b>1 &lt; 2</b><c /></a>",
            format!("{}", doc.borrow())
        );
    }

    #[test]
    fn test_structural_eq() {
        let left = document("<a><b>1</b></a>");
        let right = document("<a><b>1</b></a>");
        let other = document("<a><b>2</b></a>");

        assert_eq!(*left.borrow(), *right.borrow());
        assert_ne!(*left.borrow(), *other.borrow());

        let left = XmlItem::Document(left);
        let right = XmlItem::Document(right);
        assert_eq!(left, right);
        assert!(!left.ptr_eq(&right));
    }
}

//! Single pass over the document, one handler per element kind.
//!
//! Every handler is entered right after its start event and returns right
//! after the matching end event, so the cursor is always positioned between
//! siblings when control returns to the caller.

use geo::Coord;
use waymark_core::{Bounds, DataSource, Dataset, Primitive, PrimitiveId, PrimitiveKind};

use super::{
    DiagnosticKind, ImportError, ImportErrorKind, StartElement, Tokenizer, XmlEvent,
    diagnostic::Diagnostics,
    fields::{CommonFields, FieldReader},
    schema::SchemaVersion,
    staging::{DeferredGraph, MemberRef},
};

fn is_root(name: &str) -> bool {
    matches!(name, "osm" | "osmChange")
}

pub(crate) struct ElementParser<'a, T: Tokenizer> {
    tokenizer: &'a mut T,
    dataset: &'a mut Dataset,
    diagnostics: &'a mut Diagnostics,
    staging: DeferredGraph,
    /// Set once the root element has been closed.
    root_closed: bool,
}

impl<'a, T: Tokenizer> ElementParser<'a, T> {
    pub fn new(
        tokenizer: &'a mut T,
        dataset: &'a mut Dataset,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            tokenizer,
            dataset,
            diagnostics,
            staging: DeferredGraph::default(),
            root_closed: false,
        }
    }

    /// Stream the whole document into a staging area.
    pub fn parse(mut self) -> Result<DeferredGraph, ImportError> {
        match self.parse_document() {
            Ok(()) => Ok(self.staging),
            Err(kind) => Err(ImportError::new(kind, self.tokenizer.location())),
        }
    }

    fn parse_document(&mut self) -> Result<(), ImportErrorKind> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(element) if !self.root_closed && is_root(element.name()) => {
                    self.parse_root(&element)?;
                }
                XmlEvent::Start(element) => self.skip_unknown(&element)?,
                XmlEvent::End => return Err(ImportErrorKind::UnbalancedEnd),
                XmlEvent::Eof => break,
            }
        }
        if self.root_closed {
            Ok(())
        } else {
            Err(ImportErrorKind::MissingRoot)
        }
    }

    fn parse_root(&mut self, root: &StartElement) -> Result<(), ImportErrorKind> {
        let token = root
            .attribute("version")
            .ok_or(ImportErrorKind::MissingRootVersion)?;
        let schema =
            SchemaVersion::from_token(token).ok_or_else(|| ImportErrorKind::UnsupportedVersion {
                found: token.to_owned(),
            })?;
        self.dataset.set_version(schema.token());
        let generator = root.attribute("generator");
        self.children(root.name(), |parser, child| match child.name() {
            "bounds" => parser.parse_bounds(child, generator),
            "node" => parser.parse_point(child, schema),
            "way" => parser.parse_path(child, schema),
            "relation" => parser.parse_relation(child, schema),
            _ => parser.skip_unknown(child),
        })?;
        self.root_closed = true;
        Ok(())
    }

    fn parse_bounds(
        &mut self,
        element: &StartElement,
        generator: Option<&str>,
    ) -> Result<(), ImportErrorKind> {
        let corner = |name: &'static str| -> Result<Option<f64>, ImportErrorKind> {
            element
                .attribute(name)
                .map(|raw| parse_float(element, name, raw))
                .transpose()
        };
        let (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) = (
            corner("minlat")?,
            corner("minlon")?,
            corner("maxlat")?,
            corner("maxlon")?,
        ) else {
            return Err(ImportErrorKind::IncompleteBounds);
        };
        let mut bounds = Bounds::new(min_lat, min_lon, max_lat, max_lon);
        if bounds.is_out_of_world() {
            let normalised = bounds.normalised();
            self.diagnostics.emit(
                DiagnosticKind::BoundsNormalised,
                format!("bounding box {bounds} is out of the world; normalised to {normalised}"),
                self.tokenizer.location(),
            );
            bounds = normalised;
        }
        let origin = element.attribute("origin").or(generator).map(str::to_owned);
        self.dataset.add_data_source(DataSource { bounds, origin });
        self.jump_to_end(element)
    }

    fn parse_point(
        &mut self,
        element: &StartElement,
        schema: SchemaVersion,
    ) -> Result<(), ImportErrorKind> {
        let fields = self.read_fields(element, PrimitiveKind::Point, schema)?;
        let coord = read_coord(element, fields.key.id)?;
        let mut point = fields.into_primitive();
        point.set_coord(coord)?;
        self.children(element.name(), |parser, child| match child.name() {
            "tag" => parse_tag(child, &mut point).and_then(|()| parser.jump_to_end(child)),
            _ => parser.skip_unknown(child),
        })?;
        let replaced = self.staging.register_point(point);
        self.finish_element(replaced)
    }

    fn parse_path(
        &mut self,
        element: &StartElement,
        schema: SchemaVersion,
    ) -> Result<(), ImportErrorKind> {
        let mut path = self
            .read_fields(element, PrimitiveKind::Path, schema)?
            .into_primitive();
        let mut nodes = Vec::new();
        self.children(element.name(), |parser, child| match child.name() {
            "nd" => {
                nodes.push(parse_node_ref(child, path.id())?);
                parser.jump_to_end(child)
            }
            "tag" => parse_tag(child, &mut path).and_then(|()| parser.jump_to_end(child)),
            _ => parser.skip_unknown(child),
        })?;
        if path.deleted && !nodes.is_empty() {
            self.diagnostics.emit(
                DiagnosticKind::DeletedPathWithNodes,
                format!("deleted way {} lists nodes; discarding them", path.id()),
                self.tokenizer.location(),
            );
            nodes.clear();
        }
        let replaced = self.staging.register_path(path, nodes);
        self.finish_element(replaced)
    }

    fn parse_relation(
        &mut self,
        element: &StartElement,
        schema: SchemaVersion,
    ) -> Result<(), ImportErrorKind> {
        let mut relation = self
            .read_fields(element, PrimitiveKind::Relation, schema)?
            .into_primitive();
        let mut members = Vec::new();
        self.children(element.name(), |parser, child| match child.name() {
            "member" => {
                members.push(parse_member(child, relation.id())?);
                parser.jump_to_end(child)
            }
            "tag" => parse_tag(child, &mut relation).and_then(|()| parser.jump_to_end(child)),
            _ => parser.skip_unknown(child),
        })?;
        if relation.deleted && !members.is_empty() {
            self.diagnostics.emit(
                DiagnosticKind::DeletedRelationWithMembers,
                format!(
                    "deleted relation {} lists members; discarding them",
                    relation.id()
                ),
                self.tokenizer.location(),
            );
            members.clear();
        }
        let replaced = self.staging.register_relation(relation, members);
        self.finish_element(replaced)
    }

    fn read_fields(
        &mut self,
        element: &StartElement,
        kind: PrimitiveKind,
        schema: SchemaVersion,
    ) -> Result<CommonFields, ImportErrorKind> {
        let location = self.tokenizer.location();
        FieldReader::new(element, kind, schema, location)
            .read(self.dataset.users_mut(), self.diagnostics)
    }

    fn finish_element(&mut self, replaced: Option<Primitive>) -> Result<(), ImportErrorKind> {
        if let Some(previous) = replaced {
            self.diagnostics.emit(
                DiagnosticKind::DuplicatePrimitive,
                format!(
                    "{} appears more than once; keeping the last occurrence",
                    previous.key()
                ),
                self.tokenizer.location(),
            );
        }
        Ok(())
    }

    /// Visit each child of the element whose start was just read.
    fn children(
        &mut self,
        parent: &str,
        mut visit: impl FnMut(&mut Self, &StartElement) -> Result<(), ImportErrorKind>,
    ) -> Result<(), ImportErrorKind> {
        loop {
            match self.next_event()? {
                XmlEvent::Start(child) => visit(self, &child)?,
                XmlEvent::End => return Ok(()),
                XmlEvent::Eof => {
                    return Err(ImportErrorKind::UnexpectedEndOfStream {
                        within: parent.to_owned(),
                    });
                }
            }
        }
    }

    /// Skip to the end of a leaf element, reporting any children it has.
    fn jump_to_end(&mut self, element: &StartElement) -> Result<(), ImportErrorKind> {
        self.children(element.name(), |parser, child| parser.skip_unknown(child))
    }

    /// Report an unrecognised element and skip its subtree silently.
    fn skip_unknown(&mut self, element: &StartElement) -> Result<(), ImportErrorKind> {
        self.diagnostics.emit(
            DiagnosticKind::UnknownElement,
            format!("skipping unknown element <{}>", element.name()),
            self.tokenizer.location(),
        );
        let mut depth = 1_usize;
        while depth > 0 {
            match self.next_event()? {
                XmlEvent::Start(_) => depth += 1,
                XmlEvent::End => depth -= 1,
                XmlEvent::Eof => {
                    return Err(ImportErrorKind::UnexpectedEndOfStream {
                        within: element.name().to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    fn next_event(&mut self) -> Result<XmlEvent, ImportErrorKind> {
        self.tokenizer
            .next_event()
            .map_err(|source| ImportErrorKind::Stream {
                source: Box::new(source),
            })
    }
}

fn parse_tag(element: &StartElement, primitive: &mut Primitive) -> Result<(), ImportErrorKind> {
    let key = required(element, "k")?;
    let value = required(element, "v")?;
    primitive.put_tag(key, value);
    Ok(())
}

fn parse_node_ref(element: &StartElement, path: i64) -> Result<i64, ImportErrorKind> {
    let node = parse_id(element, "ref")?;
    if node == 0 {
        return Err(ImportErrorKind::IllegalNodeReference { path });
    }
    Ok(node)
}

fn parse_member(element: &StartElement, relation: i64) -> Result<MemberRef, ImportErrorKind> {
    let member = parse_id(element, "ref")?;
    let token = required(element, "type")?;
    let kind = token
        .parse::<PrimitiveKind>()
        .map_err(|err| ImportErrorKind::UnknownMemberKind {
            relation,
            member,
            value: err.token,
        })?;
    if member == 0 {
        return Err(ImportErrorKind::IllegalMemberReference { relation });
    }
    Ok(MemberRef {
        target: PrimitiveId::new(kind, member),
        role: element.attribute("role").unwrap_or_default().to_owned(),
    })
}

/// Read `lat`/`lon`; both or neither must be present.
fn read_coord(element: &StartElement, id: i64) -> Result<Option<Coord<f64>>, ImportErrorKind> {
    match (element.attribute("lat"), element.attribute("lon")) {
        (Some(lat), Some(lon)) => Ok(Some(Coord {
            x: parse_float(element, "lon", lon)?,
            y: parse_float(element, "lat", lat)?,
        })),
        (None, None) => Ok(None),
        _ => Err(ImportErrorKind::IncompleteCoordinate { id }),
    }
}

fn required<'e>(
    element: &'e StartElement,
    attribute: &'static str,
) -> Result<&'e str, ImportErrorKind> {
    element
        .attribute(attribute)
        .ok_or_else(|| ImportErrorKind::MissingAttribute {
            element: element.name().to_owned(),
            attribute,
        })
}

fn parse_id(element: &StartElement, attribute: &'static str) -> Result<i64, ImportErrorKind> {
    let raw = required(element, attribute)?;
    raw.parse().map_err(|_| invalid(element, attribute, raw))
}

fn parse_float(
    element: &StartElement,
    attribute: &'static str,
    raw: &str,
) -> Result<f64, ImportErrorKind> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| invalid(element, attribute, raw))
}

fn invalid(element: &StartElement, attribute: &'static str, raw: &str) -> ImportErrorKind {
    ImportErrorKind::InvalidAttribute {
        element: element.name().to_owned(),
        attribute,
        value: raw.to_owned(),
    }
}

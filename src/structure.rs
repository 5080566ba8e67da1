//! Java syntax extraction on top of tree-sitter.
//!
//! Every class, interface and enum declaration in a unit is extracted,
//! including nested and local ones. Members are the direct members of each
//! body. Call and `new` sites are collected from the whole method body,
//! lambdas and anonymous classes included.

use tree_sitter::{Node, Parser};

use crate::error::{DeclarationError, SourceError};
use crate::syntax::{
    Modifiers, RawBody, RawClass, RawDeclaration, RawEnum, RawField, RawMethod, RawParam,
    RawSite, SyntaxUnit,
};

pub fn java_parser() -> Result<Parser, SourceError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| SourceError::Grammar {
            message: e.to_string(),
        })?;
    Ok(parser)
}

pub fn parse_unit(origin: &str, source: &str) -> Result<SyntaxUnit, SourceError> {
    let mut parser = java_parser()?;
    parse_unit_with(&mut parser, origin, source)
}

pub fn parse_unit_with(
    parser: &mut Parser,
    origin: &str,
    source: &str,
) -> Result<SyntaxUnit, SourceError> {
    let tree = parser.parse(source, None).ok_or_else(|| SourceError::NoTree {
        origin: origin.to_string(),
    })?;

    let mut unit = SyntaxUnit {
        origin: origin.to_string(),
        declarations: Vec::new(),
    };
    let ctx = Ctx {
        origin,
        source: source.as_bytes(),
    };
    collect_declarations(&ctx, tree.root_node(), &mut unit.declarations);
    Ok(unit)
}

struct Ctx<'a> {
    origin: &'a str,
    source: &'a [u8],
}

impl Ctx<'_> {
    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.text(n).to_string())
    }
}

fn collect_declarations(
    ctx: &Ctx,
    node: Node,
    out: &mut Vec<Result<RawDeclaration, DeclarationError>>,
) {
    match node.kind() {
        "class_declaration" | "interface_declaration" => {
            out.push(extract_class(ctx, node).map(RawDeclaration::Class));
        }
        "enum_declaration" => {
            out.push(extract_enum(ctx, node).map(RawDeclaration::Enum));
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_declarations(ctx, child, out);
    }
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn declared_name(ctx: &Ctx, node: Node, kind: &'static str) -> Result<String, DeclarationError> {
    let line = line_of(node);
    let name = ctx
        .field_text(node, "name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DeclarationError::Unnamed {
            origin: ctx.origin.to_string(),
            kind,
            line,
        })?;

    if node.has_error() {
        return Err(DeclarationError::Malformed {
            origin: ctx.origin.to_string(),
            kind,
            name,
            line,
        });
    }
    Ok(name)
}

fn extract_class(ctx: &Ctx, node: Node) -> Result<RawClass, DeclarationError> {
    let is_interface = node.kind() == "interface_declaration";
    let kind = if is_interface { "interface" } else { "class" };
    let name = declared_name(ctx, node, kind)?;
    let (modifiers, annotations) = extract_modifiers(ctx, node);

    let mut class = RawClass {
        name,
        is_interface,
        modifiers,
        annotations,
        javadoc: extract_javadoc(ctx, node),
        line: line_of(node),
        ..RawClass::default()
    };

    if let Some(superclass) = node.child_by_field_name("superclass") {
        let mut cursor = superclass.walk();
        for child in superclass.named_children(&mut cursor) {
            class.extends.push(supertype_name(ctx.text(child)));
        }
    }
    if let Some(interfaces) = node.child_by_field_name("interfaces") {
        class.implements = type_list(ctx, interfaces);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "extends_interfaces" {
            class.extends.extend(type_list(ctx, child));
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => {
                    class.fields.extend(extract_fields(ctx, member));
                }
                "method_declaration" => class.methods.push(extract_method(ctx, member)),
                "constructor_declaration" => {
                    class.constructors.push(extract_method(ctx, member));
                }
                _ => {}
            }
        }
    }

    Ok(class)
}

fn extract_enum(ctx: &Ctx, node: Node) -> Result<RawEnum, DeclarationError> {
    let name = declared_name(ctx, node, "enum")?;
    let mut raw = RawEnum {
        name,
        line: line_of(node),
        ..RawEnum::default()
    };

    let Some(body) = node.child_by_field_name("body") else {
        return Ok(raw);
    };
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "enum_constant" => {
                if let Some(constant) = ctx.field_text(child, "name") {
                    raw.constants.push(constant);
                }
            }
            "enum_body_declarations" => {
                let mut inner_cursor = child.walk();
                for inner in child.children(&mut inner_cursor) {
                    if inner.kind() == "method_declaration" {
                        raw.methods.push(extract_method(ctx, inner));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(raw)
}

/// `extends a.b.Base<T>` is recorded as `Base`.
fn supertype_name(text: &str) -> String {
    let unscoped = text.split('<').next().unwrap_or(text);
    unscoped
        .rsplit('.')
        .next()
        .unwrap_or(unscoped)
        .trim()
        .to_string()
}

fn type_list(ctx: &Ctx, node: Node) -> Vec<String> {
    let mut types = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut inner_cursor = child.walk();
            for ty in child.named_children(&mut inner_cursor) {
                types.push(supertype_name(ctx.text(ty)));
            }
        }
    }
    types
}

fn extract_modifiers(ctx: &Ctx, node: Node) -> (Modifiers, Vec<String>) {
    let mut modifiers = Modifiers::default();
    let mut annotations = Vec::new();

    let mut cursor = node.walk();
    let Some(mod_node) = node
        .children(&mut cursor)
        .find(|n| n.kind() == "modifiers")
    else {
        return (modifiers, annotations);
    };

    let mut cursor = mod_node.walk();
    for child in mod_node.children(&mut cursor) {
        match child.kind() {
            "public" => modifiers.is_public = true,
            "private" => modifiers.is_private = true,
            "protected" => modifiers.is_protected = true,
            "static" => modifiers.is_static = true,
            "abstract" => modifiers.is_abstract = true,
            "synchronized" => modifiers.is_synchronized = true,
            "marker_annotation" | "annotation" => {
                if let Some(name) = ctx.field_text(child, "name") {
                    annotations.push(name);
                }
            }
            _ => {}
        }
    }
    (modifiers, annotations)
}

fn extract_javadoc(ctx: &Ctx, node: Node) -> Option<String> {
    let mut prev = node.prev_sibling();
    while let Some(sibling) = prev {
        match sibling.kind() {
            "line_comment" => prev = sibling.prev_sibling(),
            "block_comment" => {
                let text = ctx.text(sibling);
                return text.starts_with("/**").then(|| text.to_string());
            }
            _ => return None,
        }
    }
    None
}

fn extract_fields(ctx: &Ctx, node: Node) -> Vec<RawField> {
    let (modifiers, annotations) = extract_modifiers(ctx, node);
    let type_text = ctx.field_text(node, "type").unwrap_or_default();

    let mut fields = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = ctx.field_text(declarator, "name") {
            fields.push(RawField {
                modifiers,
                annotations: annotations.clone(),
                type_text: type_text.clone(),
                name,
            });
        }
    }
    fields
}

fn extract_method(ctx: &Ctx, node: Node) -> RawMethod {
    let (modifiers, annotations) = extract_modifiers(ctx, node);
    let is_constructor = node.kind() == "constructor_declaration";

    RawMethod {
        name: ctx.field_text(node, "name").unwrap_or_default(),
        modifiers,
        annotations,
        return_type: if is_constructor {
            None
        } else {
            ctx.field_text(node, "type")
        },
        params: node
            .child_by_field_name("parameters")
            .map(|p| extract_params(ctx, p))
            .unwrap_or_default(),
        body: node.child_by_field_name("body").map(|b| extract_body(ctx, b)),
        line: line_of(node),
    }
}

fn extract_params(ctx: &Ctx, node: Node) -> Vec<RawParam> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "formal_parameter" => params.push(RawParam {
                type_text: ctx.field_text(child, "type").unwrap_or_default(),
                name: ctx.field_text(child, "name").unwrap_or_default(),
            }),
            "spread_parameter" => {
                let mut type_text = String::new();
                let mut name = String::new();
                let mut inner_cursor = child.walk();
                for part in child.named_children(&mut inner_cursor) {
                    match part.kind() {
                        "modifiers" => {}
                        "variable_declarator" => {
                            name = ctx.field_text(part, "name").unwrap_or_default();
                        }
                        "identifier" => name = ctx.text(part).to_string(),
                        _ if type_text.is_empty() => type_text = ctx.text(part).to_string(),
                        _ => {}
                    }
                }
                params.push(RawParam { type_text, name });
            }
            _ => {}
        }
    }
    params
}

fn extract_body(ctx: &Ctx, node: Node) -> RawBody {
    let mut sites = Vec::new();
    collect_sites(ctx, node, &mut sites);
    RawBody {
        text: ctx.text(node).to_string(),
        sites,
    }
}

fn collect_sites(ctx: &Ctx, node: Node, sites: &mut Vec<RawSite>) {
    match node.kind() {
        "method_invocation" => {
            if let Some(name) = ctx.field_text(node, "name") {
                sites.push(RawSite::Call {
                    receiver: ctx.field_text(node, "object"),
                    name,
                    line: line_of(node),
                });
            }
        }
        "object_creation_expression" => {
            if let Some(type_text) = ctx.field_text(node, "type") {
                sites.push(RawSite::Construction {
                    type_text,
                    line: line_of(node),
                });
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_sites(ctx, child, sites);
    }
}

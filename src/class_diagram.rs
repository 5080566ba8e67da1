use std::fmt::{self, Write};

use crate::model::{ClassEntity, CodeModel, EnumEntity, FieldDescriptor, MemberSignature, join_annotations};

pub const HEADER: &str = "classDiagram";

const COMMENT_LIMIT: usize = 50;
const COMMENT_KEEP: usize = 47;

/// Renders the model as a Mermaid class diagram. Tables are walked in
/// declaration order, enums first.
pub fn render(model: &CodeModel) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_diagram(model, &mut out);
    out
}

pub fn write_diagram(model: &CodeModel, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "{HEADER}")?;

    for entity in model.enums.values() {
        write_enum(entity, out)?;
    }
    for entity in model.classes.values() {
        write_class(entity, out)?;
    }
    write_edges(model, out)
}

fn write_enum(entity: &EnumEntity, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "class {} {{", entity.name)?;
    writeln!(out, "<<enumeration>>")?;
    for constant in &entity.constants {
        writeln!(out, "  {constant}")?;
    }
    writeln!(out, "}}")
}

fn write_class(entity: &ClassEntity, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "class {} {{", entity.name)?;
    writeln!(out, "  {}", entity.kind.label())?;
    if !entity.annotations.is_empty() {
        writeln!(out, "  {}", join_annotations(&entity.annotations))?;
    }
    if !entity.comment.is_empty() {
        writeln!(out, "  %% {}", summarize_comment(&entity.comment))?;
    }
    for field in &entity.fields {
        writeln!(out, "{}", field_line(field))?;
    }

    if !entity.constructors.is_empty() {
        writeln!(out, "%% ⚙ Constructors")?;
        for ctor in &entity.constructors {
            writeln!(out, "⚙ {}", ctor.signature())?;
        }
    }
    write_group(out, "%% 🔘 Getters/Setters", &entity.accessors)?;
    write_group(out, "%% 🛠 User-Defined Methods", &entity.user_methods)?;
    write_group(out, "%% 🏛 System/Overridden Methods", &entity.framework_methods)?;
    writeln!(out, "}}")
}

fn write_group(out: &mut impl Write, title: &str, members: &[MemberSignature]) -> fmt::Result {
    if members.is_empty() {
        return Ok(());
    }
    writeln!(out, "{title}")?;
    for member in members {
        let marker = member.kind.map(|k| k.marker()).unwrap_or("⚙");
        writeln!(out, "{marker} {}", member.signature())?;
    }
    Ok(())
}

fn write_edges(model: &CodeModel, out: &mut impl Write) -> fmt::Result {
    for (from, targets) in model.uses.iter() {
        for to in targets {
            if to != from && model.is_known(to) {
                writeln!(out, "{from} --> {to} : uses")?;
            }
        }
    }
    for (sub, supers) in model.extends.iter() {
        for sup in supers {
            if model.classes.contains_key(sup) {
                writeln!(out, "{sub} --|> {sup} : extends")?;
            }
        }
    }
    for (implementor, ifaces) in model.implements.iter() {
        for iface in ifaces {
            if model.classes.contains_key(iface) {
                writeln!(out, "{implementor} ..|> {iface} : implements")?;
            }
        }
    }
    Ok(())
}

fn field_line(field: &FieldDescriptor) -> String {
    let base = format!(
        "{} {} {}",
        field.visibility.field_glyph(),
        field.type_name,
        field.name
    );
    if field.annotations.is_empty() {
        format!("  {base}")
    } else {
        format!("  {} {base}", join_annotations(&field.annotations))
    }
}

/// Single-line comment: long text is cut to 47 characters plus `...`.
pub fn summarize_comment(comment: &str) -> String {
    let shortened = if comment.chars().count() > COMMENT_LIMIT {
        let mut cut: String = comment.chars().take(COMMENT_KEEP).collect();
        cut.push_str("...");
        cut
    } else {
        comment.to_string()
    };
    shortened.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{MethodKind, Visibility};
    use crate::model::{ClassKind, Parameter};
    use pretty_assertions::assert_eq;

    fn signature(name: &str, kind: Option<MethodKind>) -> MemberSignature {
        MemberSignature {
            visibility: Visibility::Public,
            annotations: Vec::new(),
            return_type: kind.map(|_| "void".to_string()),
            name: name.to_string(),
            params: Vec::new(),
            kind,
        }
    }

    #[test]
    fn empty_model_renders_header_only() {
        assert_eq!(render(&CodeModel::new()), "classDiagram\n");
    }

    #[test]
    fn renders_enums_then_classes_then_edges() {
        let mut model = CodeModel::new();
        model.insert_enum(EnumEntity {
            name: "Status".to_string(),
            constants: vec!["OPEN".to_string(), "CLOSED".to_string()],
        });

        let mut order = ClassEntity::new("Order", ClassKind::Class);
        order.annotations = vec!["Entity".to_string()];
        order.comment = "An order.".to_string();
        order.fields.push(FieldDescriptor {
            visibility: Visibility::Private,
            annotations: vec!["Id".to_string()],
            type_name: "long".to_string(),
            name: "id".to_string(),
        });
        order.fields.push(FieldDescriptor {
            visibility: Visibility::Private,
            annotations: Vec::new(),
            type_name: "Status".to_string(),
            name: "status".to_string(),
        });
        order.constructors.push(MemberSignature {
            visibility: Visibility::Public,
            annotations: Vec::new(),
            return_type: None,
            name: "Order".to_string(),
            params: vec![Parameter {
                type_name: "long".to_string(),
                name: "id".to_string(),
            }],
            kind: None,
        });
        order.accessors.push(signature("getId", Some(MethodKind::Accessor)));
        order.user_methods.push(signature("place", Some(MethodKind::User)));
        order
            .framework_methods
            .push(signature("toString", Some(MethodKind::Framework { overridden: true })));
        model.insert_class(order);
        model.insert_class(ClassEntity::new("Auditable", ClassKind::Interface));

        model.add_uses("Order", "Status");
        model.add_uses("Order", "long");
        model.add_uses("Order", "Order");
        model.add_implements("Order", "Auditable");
        model.add_extends("Order", "BaseEntity");

        let expected = "\
classDiagram
class Status {
<<enumeration>>
  OPEN
  CLOSED
}
class Order {
  🅲Class
  @Entity
  %% An order.
  @Id 🔒 long id
  🔒 Status status
%% ⚙ Constructors
⚙ 🟢 Order(long id)
%% 🔘 Getters/Setters
🔘 🟢 void getId()
%% 🛠 User-Defined Methods
🛠 🟢 void place()
%% 🏛 System/Overridden Methods
🔁🏛 🟢 void toString()
}
class Auditable {
  🅘Interface
}
Order --> Status : uses
Order ..|> Auditable : implements
";
        assert_eq!(render(&model), expected);
    }

    #[test]
    fn extends_to_unknown_class_is_dropped() {
        let mut model = CodeModel::new();
        model.insert_class(ClassEntity::new("Child", ClassKind::Class));
        model.insert_class(ClassEntity::new("Parent", ClassKind::AbstractClass));
        model.add_extends("Child", "Parent");
        model.add_extends("Child", "Ghost");

        let text = render(&model);
        assert!(text.contains("Child --|> Parent : extends"));
        assert!(!text.contains("Ghost"));
        assert!(text.contains("🅰Abstract Class"));
    }

    #[test]
    fn uses_edge_may_point_at_enum_but_extends_may_not() {
        let mut model = CodeModel::new();
        model.insert_class(ClassEntity::new("Light", ClassKind::Class));
        model.insert_enum(EnumEntity {
            name: "Color".to_string(),
            constants: vec!["RED".to_string()],
        });
        model.add_uses("Light", "Color");
        model.add_extends("Light", "Color");

        let text = render(&model);
        assert!(text.contains("Light --> Color : uses"));
        assert!(!text.contains("--|>"));
    }

    #[test]
    fn package_private_field_and_method_glyphs_differ() {
        let mut model = CodeModel::new();
        let mut entity = ClassEntity::new("Counter", ClassKind::Class);
        entity.fields.push(FieldDescriptor {
            visibility: Visibility::Package,
            annotations: Vec::new(),
            type_name: "int".to_string(),
            name: "count".to_string(),
        });
        let mut bump = signature("bump", Some(MethodKind::User));
        bump.visibility = Visibility::Package;
        entity.user_methods.push(bump);
        model.insert_class(entity);

        let text = render(&model);
        assert!(text.contains("  🅾️ int count\n"));
        assert!(text.contains("🛠 ~ void bump()\n"));
    }

    #[test]
    fn long_comments_are_truncated_and_flattened() {
        let long = format!("{}\n{}", "a".repeat(30), "b".repeat(30));
        let summary = summarize_comment(&long);
        assert_eq!(summary.chars().count(), 50);
        assert!(summary.ends_with("..."));
        assert!(!summary.contains('\n'));

        assert_eq!(summarize_comment("line one\nline two"), "line one line two");
        let exactly_fifty = "x".repeat(50);
        assert_eq!(summarize_comment(&exactly_fifty), exactly_fifty);
    }
}

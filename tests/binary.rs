mod common;

use common::BinaryWriter;
use dmx_reader::{
    Angle, AttrType, Attribute, Color, DmxError, Matrix, Quaternion, Vector2, Vector3, Vector4, serializers::MISSING_ELEMENT_NAME,
};

#[test]
fn load_version5_binary() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "child", "count", "values", "DmeModel"]);

    writer.int(2);
    writer.int(0).int(1).guid(1);
    writer.int(5).int(2).guid(2);

    writer.int(3);
    writer.int(3).byte(2).int(7);
    writer.int(4).byte(17).int(3).float(1.0).float(2.0).float(3.0);
    writer.int(2).byte(1).int(1);
    writer.int(0);

    let file = writer.load().unwrap();
    assert_eq!(file.get_elements().len(), 2);

    let root = file.get_root().unwrap();
    assert_eq!(root.get_name(), "root");
    assert_eq!(root.get_class(), "DmElement");
    assert_eq!(root.get_guid(), &[1; 16]);
    assert_eq!(root.get_value::<i32>("count"), Some(&7));

    let values = root.get_attribute("values").unwrap();
    assert_eq!(values.get_type(), AttrType::FloatArray);
    assert_eq!(
        values.as_array_of(AttrType::FloatArray),
        Some([Attribute::Float(1.0), Attribute::Float(2.0), Attribute::Float(3.0)].as_slice())
    );

    let child = root.get("child").unwrap();
    assert_eq!(child.get_class(), "DmeModel");
    assert_eq!(root.get_element("child"), Some(child));
}

#[test]
fn missing_element_creates_placeholder() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "target"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(1);
    writer.int(2).byte(1).int(-2).string("3d2b7a4c-0f1e-4b5a-9c8d-7e6f5a4b3c2d");

    let file = writer.load().unwrap();
    assert_eq!(file.get_elements().len(), 2);

    let root = file.get_root().unwrap();
    let target = root.get_element("target").unwrap();
    assert_eq!(target.get_name(), MISSING_ELEMENT_NAME);
    assert_eq!(target.get_handle().index(), 1);
    assert!(root.get(MISSING_ELEMENT_NAME).is_some());
}

#[test]
fn empty_references_and_arrays() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "none", "list", "item"]);

    writer.int(2);
    writer.int(0).int(1).guid(0);
    writer.int(0).int(4).guid(0);

    writer.int(2);
    writer.int(2).byte(1).int(-1);
    writer.int(3).byte(15).int(2).int(-1).int(1);
    writer.int(0);

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    assert_eq!(root.get_attribute("none"), Some(&Attribute::Element(None)));
    assert!(root.get_element("none").is_none());

    let members = root.get_element_array("list").unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(root.get("item").map(|item| item.get_handle()), Some(members[0].get_handle()));
}

#[test]
fn array_strings_are_inline() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "tags", "label"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(2);
    writer.int(2).byte(19).int(2).string("first").string("second");
    writer.int(3).byte(5).int(1);

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    let tags = root.get_attribute("tags").unwrap().as_array_of(AttrType::StringArray).unwrap();
    assert_eq!(tags[1].as_string(), Some("second"));
    assert_eq!(root.get_attribute("label").and_then(Attribute::as_string), Some("root"));
}

#[test]
fn fixed_width_values() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&[
        "DmElement", "root", "uv", "plane", "angles", "rotation", "transform", "tints", "frames",
    ]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(7);
    writer.int(2).byte(9).float(0.25).float(0.75);
    writer.int(3).byte(11).float(1.0).float(2.0).float(3.0).float(4.0);
    writer.int(4).byte(12).float(10.0).float(20.0).float(30.0);
    writer.int(5).byte(13).float(0.1).float(0.2).float(0.3).float(0.9);
    writer.int(6).byte(14);
    for value in 0..16 {
        writer.float(value as f32);
    }
    writer.int(7).byte(22).int(2).byte(1).byte(2).byte(3).byte(4).byte(5).byte(6).byte(7).byte(8);
    writer.int(8).byte(28).int(1);
    for value in 16..32 {
        writer.float(value as f32);
    }

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    assert_eq!(root.get_value::<Vector2>("uv"), Some(&Vector2 { x: 0.25, y: 0.75 }));
    assert_eq!(
        root.get_value::<Vector4>("plane"),
        Some(&Vector4 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            w: 4.0
        })
    );
    assert_eq!(
        root.get_value::<Angle>("angles"),
        Some(&Angle {
            pitch: 10.0,
            yaw: 20.0,
            roll: 30.0
        })
    );
    assert_eq!(
        root.get_value::<Quaternion>("rotation"),
        Some(&Quaternion {
            x: 0.1,
            y: 0.2,
            z: 0.3,
            w: 0.9
        })
    );

    let transform = root.get_value::<Matrix>("transform").unwrap();
    assert_eq!(transform.entries[0], [0.0, 1.0, 2.0, 3.0]);
    assert_eq!(transform.entries[3], [12.0, 13.0, 14.0, 15.0]);

    let tints = root.get_attribute("tints").unwrap().as_array_of(AttrType::ColorArray).unwrap();
    assert_eq!(
        tints[1].as_color(),
        Some(Color {
            red: 5,
            green: 6,
            blue: 7,
            alpha: 8
        })
    );

    let frames = root.get_attribute("frames").unwrap().as_array_of(AttrType::MatrixArray).unwrap();
    assert_eq!(frames[0].as_matrix().map(|matrix| matrix.entries[2]), Some([24.0, 25.0, 26.0, 27.0]));
}

#[test]
fn load_version4_binary() {
    let mut writer = BinaryWriter::new(4);
    writer.string_table(&["DmElement", "root", "position", "label", "text"]);

    writer.int(1);
    writer.short(0).short(1).guid(0);

    writer.int(2);
    writer.short(2).byte(10).float(1.0).float(2.0).float(3.0);
    writer.short(3).byte(5).short(4);

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    assert_eq!(root.get_value::<Vector3>("position"), Some(&Vector3 { x: 1.0, y: 2.0, z: 3.0 }));
    assert_eq!(root.get_value::<String>("label").map(String::as_str), Some("text"));
}

#[test]
fn load_version3_binary() {
    let mut writer = BinaryWriter::new(3);
    writer.short(3);
    writer.string("DmElement").string("start").string("label");

    writer.int(1);
    writer.short(0).string("inline name").guid(0);

    writer.int(2);
    writer.short(1).byte(7).int(25_000);
    writer.short(2).byte(5).string("inline value");

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    assert_eq!(root.get_name(), "inline name");
    assert_eq!(root.get_attribute("start").and_then(Attribute::as_time), Some(2.5));
    assert_eq!(root.get_attribute("label").and_then(Attribute::as_string), Some("inline value"));
}

#[test]
fn load_version1_binary() {
    let mut writer = BinaryWriter::new(1);

    writer.int(1);
    writer.string("DmElement").string("root").guid(0);

    writer.int(2);
    writer.string("flag").byte(4).byte(1);
    writer.string("tint").byte(8).byte(255).byte(0).byte(128).byte(64);

    let file = writer.load().unwrap();
    let root = file.get_root().unwrap();

    assert_eq!(root.get_attribute("flag").and_then(Attribute::as_bool), Some(true));
    let tint = root.get_attribute("tint").and_then(Attribute::as_color).unwrap();
    assert_eq!((tint.red, tint.green, tint.blue, tint.alpha), (255, 0, 128, 64));
}

#[test]
fn object_ids_are_unsupported() {
    let mut writer = BinaryWriter::new(2);
    writer.short(2);
    writer.string("DmElement").string("id");

    writer.int(1);
    writer.short(0).string("root").guid(0);

    writer.int(1);
    writer.short(1).byte(7).guid(9);

    assert!(matches!(writer.load(), Err(DmxError::UnsupportedType(kind)) if kind == "ObjectId"));
}

#[test]
fn element_index_out_of_range() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "target"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(1);
    writer.int(2).byte(1).int(4);

    assert!(matches!(
        writer.load(),
        Err(DmxError::IndexOutOfRange {
            table: "element table",
            index: 4
        })
    ));
}

#[test]
fn type_id_out_of_range() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "odd"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(1);
    writer.int(2).byte(200);

    assert!(matches!(writer.load(), Err(DmxError::IndexOutOfRange { table: "type table", index: 200 })));
}

#[test]
fn string_index_out_of_range() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    assert!(matches!(writer.load(), Err(DmxError::IndexOutOfRange { table: "string table", index: 1 })));
}

#[test]
fn negative_binary_length() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "blob"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(1);
    writer.int(2).byte(6).int(-5);

    assert!(matches!(writer.load(), Err(DmxError::InvalidLength(-5))));
}

#[test]
fn binary_blob() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root", "blob"]);

    writer.int(1);
    writer.int(0).int(1).guid(0);

    writer.int(1);
    writer.int(2).byte(6).int(3).byte(9).byte(8).byte(7);

    let file = writer.load().unwrap();
    let blob = file.get_root().unwrap().get_attribute("blob").and_then(Attribute::as_binary).map(<[u8]>::to_vec);
    assert_eq!(blob, Some(vec![9, 8, 7]));
}

#[test]
fn truncated_file() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&["DmElement", "root"]);
    writer.int(3);
    writer.int(0).int(1).guid(0);

    assert!(matches!(writer.load(), Err(DmxError::Io(_))));
}

#[test]
fn version9_is_unsupported() {
    let writer = BinaryWriter::new(9);
    assert!(matches!(writer.load(), Err(DmxError::UnsupportedVersion(9))));
}

#[test]
fn header_must_name_fields() {
    let writer = BinaryWriter::with_header("<!-- dmx encoding binary 5 -->");
    assert!(matches!(writer.load(), Err(DmxError::InvalidHeader(_))));

    let writer = BinaryWriter::with_header("<!-- dmx encoding binary five format model 22 -->");
    assert!(matches!(writer.load(), Err(DmxError::InvalidHeader(_))));
}

#[test]
fn header_must_be_dmx_binary_or_keyvalues2() {
    let writer = BinaryWriter::with_header("<!-- vmf encoding binary 5 format model 22 -->");
    assert!(matches!(writer.load(), Err(DmxError::InvalidFormat(_))));

    let writer = BinaryWriter::with_header("<!-- dmx encoding xml 1 format model 22 -->");
    assert!(matches!(writer.load(), Err(DmxError::InvalidFormat(_))));

    let writer = BinaryWriter::with_header("<!-- dmx -->");
    assert!(matches!(writer.load(), Err(DmxError::InvalidFormat(_))));
}

#[test]
fn empty_binary_file() {
    let mut writer = BinaryWriter::new(5);
    writer.string_table(&[]);
    writer.int(0);

    let file = writer.load().unwrap();
    assert!(file.get_elements().is_empty());
    assert!(file.get_root().is_none());
    assert_eq!(file.get_root_attribute(), &Attribute::Element(None));
}

// tests/map_tests.rs

use tmx_map::{
    decode_tmx_str, LayerKind, LoadedTexture, MapContext, MapError, Object, Rect, WHITE,
};

/// Records every collaborator call; handles are just the source strings.
#[derive(Debug, Default)]
struct RecordingContext {
    textures: Vec<String>,
    bitmaps: Vec<String>,
}

impl MapContext for RecordingContext {
    type Texture = String;
    type Bitmap = String;
    type FileRef = String;

    fn load_texture(&mut self, source: &str) -> Result<LoadedTexture<String>, MapError> {
        self.textures.push(source.to_owned());
        Ok(LoadedTexture {
            handle: source.to_owned(),
            width: 128,
            height: 128,
        })
    }

    fn load_bitmap(&mut self, source: &str) -> Result<String, MapError> {
        self.bitmaps.push(source.to_owned());
        Ok(source.to_owned())
    }

    fn resolve_file(&mut self, source: &str) -> Result<String, MapError> {
        Ok(source.to_owned())
    }
}

const MIXED_MAP: &str = r#"
<map version="1.10" orientation="orthogonal" width="2" height="2">
  <tileset firstgid="1" name="terrain" tilewidth="8" tileheight="8"
           tilecount="4" columns="2">
    <image source="terrain.png" width="16" height="16"/>
  </tileset>
  <layer name="ground" width="2" height="2">
    <properties>
      <property name="solid" type="bool" rawValue="true"/>
    </properties>
    <data encoding="csv">
      1,2,
      3,0
    </data>
  </layer>
  <objectgroup name="spawns" draworder="index">
    <object x="4" y="4" width="8" height="8"/>
  </objectgroup>
  <imagelayer name="sky" opacity="0.25">
    <image source="sky.png"/>
  </imagelayer>
</map>
"#;

#[test]
fn decodes_a_mixed_map_in_document_order() {
    let mut ctx = RecordingContext::default();
    let map = decode_tmx_str(MIXED_MAP, &mut ctx).expect("map should decode");

    assert_eq!(map.tilesets.len(), 1);
    let tileset = &map.tilesets[0];
    assert_eq!(tileset.firstgid, 1);
    assert_eq!(tileset.name, "terrain");
    assert_eq!(tileset.image.handle, "terrain.png");

    let names: Vec<&str> = map.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["ground", "spawns", "sky"]);

    let ground = &map.layers[0];
    assert_eq!(ground.properties.get_bool("solid"), Some(true));
    assert_eq!(ground.tint_color, WHITE);
    match &ground.kind {
        LayerKind::Tiles {
            width,
            height,
            data,
        } => {
            assert_eq!((*width, *height), (2, 2));
            assert_eq!(data, &[1, 2, 3, 0]);
        }
        other => panic!("expected a tile layer, got {other:?}"),
    }

    let spawns = &map.layers[1];
    assert_eq!(spawns.draw_order, "index");
    match &spawns.kind {
        LayerKind::Objects { objects } => {
            assert_eq!(
                objects[0],
                Object::Rect {
                    bounds: Rect {
                        x: 4,
                        y: 4,
                        width: 8,
                        height: 8
                    }
                }
            );
        }
        other => panic!("expected an object layer, got {other:?}"),
    }

    let sky = &map.layers[2];
    assert_eq!(sky.opacity, 0.25);
    assert!(matches!(
        &sky.kind,
        LayerKind::Image { image: Some(handle) } if handle == "sky.png"
    ));

    assert_eq!(ctx.textures, ["terrain.png"]);
    assert_eq!(ctx.bitmaps, ["sky.png"]);
}

const BAD_LAYER_SIZE: &str = r#"
<map>
  <layer name="oops" width="2" height="2">
    <data encoding="csv">1,2,3</data>
  </layer>
</map>
"#;

#[test]
fn error_on_layer_size_mismatch() {
    let mut ctx = RecordingContext::default();
    let err = decode_tmx_str(BAD_LAYER_SIZE, &mut ctx).unwrap_err();
    assert!(matches!(
        err,
        MapError::LayerSizeMismatch { layer, expected: 4, actual: 3 } if layer == "oops"
    ));
}

const UNKNOWN_ENCODING: &str = r#"
<map>
  <layer name="weird" width="1" height="1">
    <data encoding="rle">1</data>
  </layer>
</map>
"#;

#[test]
fn error_on_unknown_encoding() {
    let mut ctx = RecordingContext::default();
    let err = decode_tmx_str(UNKNOWN_ENCODING, &mut ctx).unwrap_err();
    assert!(matches!(err, MapError::UnsupportedEncoding { encoding } if encoding == "rle"));
}

const EXTRA_SECTIONS: &str = r#"
<map>
  <editorsettings><chunksize width="16" height="16"/></editorsettings>
  <wangsets/>
  <layer name="" width="1" height="1">
    <data encoding="csv">7</data>
  </layer>
</map>
"#;

#[test]
fn skips_unrecognized_sections_and_allows_empty_layer_names() {
    let mut ctx = RecordingContext::default();
    let map = decode_tmx_str(EXTRA_SECTIONS, &mut ctx).expect("should ignore unknown sections");
    assert_eq!(map.layers.len(), 1);
    assert_eq!(map.layers[0].name, "");
    assert!(matches!(
        &map.layers[0].kind,
        LayerKind::Tiles { data, .. } if data == &[7]
    ));
}

#[test]
fn not_xml_is_a_typed_error() {
    let mut ctx = RecordingContext::default();
    let err = decode_tmx_str("{ \"this\": \"is json\" }", &mut ctx).unwrap_err();
    assert!(matches!(
        err,
        MapError::Xml { .. } | MapError::InvalidMap(_)
    ));
}

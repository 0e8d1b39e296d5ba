//! An interactive 3D view of the input structure, rendered in the browser
//! with 3Dmol.js

use std::{io::Write, path::Path};

use qcreport::geom::Structure;

use super::{PresentError, create};

const VIEWER: &str = "https://3Dmol.org/build/3Dmol-min.js";

/// escape `s` for use as HTML text
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// escape `s` for use inside a JS template literal in a `<script>` element
fn escape_js(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '`' | '$' => {
                ret.push('\\');
                ret.push(c);
            }
            // keeps `</script>` from closing the element
            '<' => ret.push_str("\\x3c"),
            c => ret.push(c),
        }
    }
    ret
}

/// A standalone HTML page showing `structure` as sticks, titled `name`
pub fn molecule_html(name: &str, structure: &Structure) -> String {
    let name = escape_html(name);
    let xyz = escape_js(&structure.to_xyz());
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{name}</title>
<script src="{VIEWER}"></script>
<style>
body {{ margin: 0; }}
#viewer {{ width: 100vw; height: 100vh; position: relative; }}
</style>
</head>
<body>
<div id="viewer"></div>
<script>
const xyz = `{xyz}`;
const viewer = $3Dmol.createViewer("viewer", {{ backgroundColor: "white" }});
viewer.addModel(xyz, "xyz");
viewer.setStyle({{}}, {{ stick: {{}} }});
viewer.zoomTo();
viewer.render();
</script>
</body>
</html>
"#
    )
}

pub fn write_html(
    path: &Path,
    name: &str,
    structure: &Structure,
) -> Result<(), PresentError> {
    let mut f = create(path)?;
    f.write_all(molecule_html(name, structure).as_bytes())
        .and_then(|_| f.flush())
        .map_err(|e| PresentError::Io(path.display().to_string(), e))
}

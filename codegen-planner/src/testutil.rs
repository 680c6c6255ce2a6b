//! Helpers shared by unit tests.

use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    {
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        writeln!(f, "{}", body).unwrap();
        f.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Argument loop understood by every fake generator: sets `$out`, `$src`,
/// `$name` and `$gens` (space-separated `--gen` values).
#[cfg(unix)]
pub const PARSE_ARGS: &str = r#"out=.
src=
gens=
while [ $# -gt 0 ]; do
  case "$1" in
    -out|-o) out="$2"; shift 2 ;;
    --gen) gens="$gens $2"; shift 2 ;;
    -I|-g) shift 2 ;;
    -f) shift ;;
    *) src="$1"; shift ;;
  esac
done
name=$(basename "$src")
name=${name%.*}"#;

/// A stand-in IDL compiler.
///
/// `cpp` writes the five C++ outputs into `$out`; `html` writes the page,
/// its `.xml` source and the page template; `py:new_style` writes the
/// package `$out/<name>/`; `c` writes `$out/gen-c/`.
#[cfg(unix)]
pub fn fake_sandesh(dir: &Path) -> PathBuf {
    let body = format!(
        r#"{}
for g in $gens; do
  case "$g" in
    cpp)
      for s in _types.h _types.cpp _constants.h _constants.cpp _html.cpp; do
        printf '// %s\n' "$s" > "$out/$name$s"
      done ;;
    html)
      printf '<page/>\n' > "$out/$name.xml"
      printf '<html/>\n' > "$out/$name.html"
      printf '// template\n' > "$out/${{name}}_html_template.cpp" ;;
    py:new_style)
      mkdir -p "$out/$name"
      for f in __init__.py constants.py ttypes.py http_request.py; do
        : > "$out/$name/$f"
      done ;;
    c)
      mkdir -p "$out/gen-c"
      : > "$out/gen-c/${{name}}_types.h"
      : > "$out/gen-c/${{name}}_types.c" ;;
  esac
done"#,
        PARSE_ARGS
    );
    write_script(dir, "sandesh", &body)
}

/// A stand-in byte-dump utility: `xxd -i <file>` prints one C array named
/// after the file.
#[cfg(unix)]
pub fn fake_dump_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "xxd",
        r#"printf 'unsigned char %s[] = { 0x3c };\n' "$2" | tr . _"#,
    )
}

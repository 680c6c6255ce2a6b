/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Generation modes and their per-mode table entries.
//!
//! A [`GenerationMode`] selects which generator runs, with which flags, what
//! it writes and which touch-ups follow.  All of that lives in one static
//! [`ModeSpec`] per mode so no call site re-derives suffixes on its own.
//!
//! | Mode | Generator | Outputs |
//! |---|---|---|
//! | `native-only` | sandesh | `<base>_types.h … <base>_html.cpp` |
//! | `native-web-view` | sandesh | same five, `_html.cpp` embeds the page |
//! | `c-binding` | sandesh | `gen-c/<base>_types.{h,c}` |
//! | `py-binding` | sandesh | `gen_py/<module>/…` + `<module>.html` |
//! | `rpc` / `rpc-async` | thrift | `gen-cpp/<base>_{types,constants}.*` + per service |
//! | `schema-backend` / `schema-types` | generateDS | `<base>_types.h`, `<base>_parser.cc`, … |

use std::fmt;
use std::str::FromStr;

// ── Generators ────────────────────────────────────────────────────────────────

/// Which external generator executable a mode drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneratorFamily {
    /// The IDL compiler.
    Sandesh,
    /// The RPC compiler.
    Thrift,
    /// The XML-schema code generator script.
    Schema,
}

impl GeneratorFamily {
    /// Short tag used in logs and error messages.
    pub fn tag(self) -> &'static str {
        match self {
            GeneratorFamily::Sandesh => "sandesh",
            GeneratorFamily::Thrift => "thrift",
            GeneratorFamily::Schema => "generateDS",
        }
    }
}

// ── Table entry ───────────────────────────────────────────────────────────────

/// Where derived names are placed relative to the output root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<prefix><base><suffix>`, next to the basename.
    Beside,
    /// `<dir><prefix><base><suffix>`, under a fixed subdirectory.
    Under(&'static str),
    /// `<prefix>gen_py/<module>/<file>`, one package per source.
    PyPackage,
}

/// Command-line shape for a mode's generator invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTemplate {
    /// `sandesh --gen cpp [--gen html] -I <inc> -out <dir>/ <src>`
    SandeshCpp { html: bool },
    /// `sandesh --gen c -o <dir> <src>`
    SandeshC,
    /// `sandesh --gen py:new_style …` followed by `sandesh --gen html …`
    SandeshPy,
    /// `thrift --gen cpp[:async] -o <dir> <src>`
    Thrift { asynchronous: bool },
    /// `generateDS.py -f -g <backend> -o <base> <src>`
    Schema { backend: &'static str },
}

/// Touch-up applied to raw generator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStep {
    /// Append an inert `int <name>_marker = 0;` to `_html.cpp`.
    AppendMarker,
    /// Embed `<name>.xml` as a byte array and the page template into `_html.cpp`.
    EmbedWebView,
}

/// Everything that varies between modes.
#[derive(Debug)]
pub struct ModeSpec {
    pub name: &'static str,
    pub family: GeneratorFamily,
    /// Order is contractual: planned artifacts follow it.
    pub suffixes: &'static [&'static str],
    pub layout: Layout,
    pub command: CommandTemplate,
    pub post_steps: &'static [PostStep],
    /// Adds one `<Service>.cpp` / `<Service>.h` pair per declared service.
    pub per_service_outputs: bool,
}

impl ModeSpec {
    /// Whether any post step needs the byte-dump utility.
    pub fn needs_dump_tool(&self) -> bool {
        self.post_steps.contains(&PostStep::EmbedWebView)
    }
}

const SANDESH_CPP_SUFFIXES: &[&str] = &[
    "_types.h",
    "_types.cpp",
    "_constants.h",
    "_constants.cpp",
    "_html.cpp",
];

const NATIVE_ONLY: ModeSpec = ModeSpec {
    name: "native-only",
    family: GeneratorFamily::Sandesh,
    suffixes: SANDESH_CPP_SUFFIXES,
    layout: Layout::Beside,
    command: CommandTemplate::SandeshCpp { html: false },
    post_steps: &[PostStep::AppendMarker],
    per_service_outputs: false,
};

const NATIVE_WEB_VIEW: ModeSpec = ModeSpec {
    name: "native-web-view",
    family: GeneratorFamily::Sandesh,
    suffixes: SANDESH_CPP_SUFFIXES,
    layout: Layout::Beside,
    command: CommandTemplate::SandeshCpp { html: true },
    post_steps: &[PostStep::EmbedWebView],
    per_service_outputs: false,
};

const C_BINDING: ModeSpec = ModeSpec {
    name: "c-binding",
    family: GeneratorFamily::Sandesh,
    suffixes: &["_types.h", "_types.c"],
    layout: Layout::Under("gen-c/"),
    command: CommandTemplate::SandeshC,
    post_steps: &[],
    per_service_outputs: false,
};

const PY_BINDING: ModeSpec = ModeSpec {
    name: "py-binding",
    family: GeneratorFamily::Sandesh,
    suffixes: &["__init__.py", "constants.py", "ttypes.py", "http_request.py"],
    layout: Layout::PyPackage,
    command: CommandTemplate::SandeshPy,
    post_steps: &[],
    per_service_outputs: false,
};

const RPC_SUFFIXES: &[&str] = &["_types.h", "_constants.h", "_types.cpp", "_constants.cpp"];

const RPC: ModeSpec = ModeSpec {
    name: "rpc",
    family: GeneratorFamily::Thrift,
    suffixes: RPC_SUFFIXES,
    layout: Layout::Under("gen-cpp/"),
    command: CommandTemplate::Thrift {
        asynchronous: false,
    },
    post_steps: &[],
    per_service_outputs: true,
};

const RPC_ASYNC: ModeSpec = ModeSpec {
    name: "rpc-async",
    command: CommandTemplate::Thrift { asynchronous: true },
    ..RPC
};

const SCHEMA_BACKEND: ModeSpec = ModeSpec {
    name: "schema-backend",
    family: GeneratorFamily::Schema,
    suffixes: &[
        "_types.h",
        "_types.cc",
        "_parser.cc",
        "_server.cc",
        "_agent.cc",
    ],
    layout: Layout::Beside,
    command: CommandTemplate::Schema {
        backend: "ifmap-backend",
    },
    post_steps: &[],
    per_service_outputs: false,
};

const SCHEMA_TYPES: ModeSpec = ModeSpec {
    name: "schema-types",
    family: GeneratorFamily::Schema,
    suffixes: &["_types.h", "_types.cc", "_parser.cc"],
    layout: Layout::Beside,
    command: CommandTemplate::Schema { backend: "type" },
    post_steps: &[],
    per_service_outputs: false,
};

// ── GenerationMode ────────────────────────────────────────────────────────────

/// Backend/target combination for one generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    NativeOnly,
    NativeWebView,
    CBinding,
    PyBinding,
    Rpc { asynchronous: bool },
    SchemaBackend,
    SchemaTypes,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 8] = [
        GenerationMode::NativeOnly,
        GenerationMode::NativeWebView,
        GenerationMode::CBinding,
        GenerationMode::PyBinding,
        GenerationMode::Rpc {
            asynchronous: false,
        },
        GenerationMode::Rpc { asynchronous: true },
        GenerationMode::SchemaBackend,
        GenerationMode::SchemaTypes,
    ];

    /// The table entry for this mode.
    pub fn spec(self) -> &'static ModeSpec {
        match self {
            GenerationMode::NativeOnly => &NATIVE_ONLY,
            GenerationMode::NativeWebView => &NATIVE_WEB_VIEW,
            GenerationMode::CBinding => &C_BINDING,
            GenerationMode::PyBinding => &PY_BINDING,
            GenerationMode::Rpc {
                asynchronous: false,
            } => &RPC,
            GenerationMode::Rpc { asynchronous: true } => &RPC_ASYNC,
            GenerationMode::SchemaBackend => &SCHEMA_BACKEND,
            GenerationMode::SchemaTypes => &SCHEMA_TYPES,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn family(self) -> GeneratorFamily {
        self.spec().family
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`GenerationMode::from_str`] for an unrecognised name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown generation mode '{0}' (valid: native-only, native-web-view, c-binding, py-binding, rpc, rpc-async, schema-backend, schema-types)")]
pub struct UnknownMode(pub String);

impl FromStr for GenerationMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenerationMode::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

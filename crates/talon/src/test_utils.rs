//
// test_utils.rs
//
// Deterministic fixture workspaces for integration tests
//

use tempfile::TempDir;

use crate::script_path::ScriptPath;

/// A temporary on-disk script workspace. Files live under a TempDir that is
/// removed when the fixture drops.
pub struct FixtureWorkspace {
    root: TempDir,
}

impl FixtureWorkspace {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create fixture workspace"),
        }
    }

    /// Write `content` at `relative` (forward slashes), creating parent
    /// directories as needed, and return its normalized absolute path.
    pub fn write_script(&self, relative: &str, content: &str) -> ScriptPath {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture directory");
        }
        std::fs::write(&path, content).expect("write fixture script");
        ScriptPath::new(path.to_str().expect("fixture path is UTF-8"))
    }

    pub fn script_path(&self, relative: &str) -> ScriptPath {
        ScriptPath::new(
            self.root
                .path()
                .join(relative)
                .to_str()
                .expect("fixture path is UTF-8"),
        )
    }

    pub fn root_dir(&self) -> &std::path::Path {
        self.root.path()
    }
}

/// A workspace with a main script, an included utility, and a library
/// directory following the `lib/<name>.ahk` convention.
pub fn standard_workspace() -> (FixtureWorkspace, ScriptPath) {
    let fixture = FixtureWorkspace::new();
    let main = fixture.write_script(
        "main.ahk",
        "#include util.ahk\n\
         result := Helper(1)\n\
         Str_Join(result)\n\
         Main() {\n\
             local_var := 2\n\
             return local_var\n\
         }\n",
    );
    fixture.write_script(
        "util.ahk",
        "Helper(x) {\n\
             doubled := x * 2\n\
             return doubled\n\
         }\n",
    );
    fixture.write_script(
        "lib/str.ahk",
        "Str_Join(parts) {\n\
             return parts\n\
         }\n",
    );
    (fixture, main)
}

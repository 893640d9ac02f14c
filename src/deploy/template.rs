//! Files shipped with every deployment.
//!
//! The dashboard sources (`App.tsx`, `types.ts`, ...) are read from the
//! template directory at deploy time; the build scaffolding around them is
//! generated here.

use super::DeployError;
use crate::theme::ReportTheme;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Dashboard sources read from the template directory, relative to it.
/// Each lands under `src/` in the deployment.
pub const TEMPLATE_SOURCES: [&str; 5] = [
    "App.tsx",
    "types.ts",
    "theme.ts",
    "components/Icons.tsx",
    "components/Logo.tsx",
];

/// One file of a deployment, as the hosting API expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployFile {
    pub file: String,
    pub data: String,
}

impl DeployFile {
    fn new(file: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            data: data.into(),
        }
    }
}

/// Dashboard sources loaded from disk.
#[derive(Debug, Clone)]
pub struct TemplateBundle {
    sources: Vec<(&'static str, String)>,
}

impl TemplateBundle {
    pub async fn load(dir: &Path) -> Result<Self, DeployError> {
        let mut sources = Vec::with_capacity(TEMPLATE_SOURCES.len());
        for relative in TEMPLATE_SOURCES {
            let path: PathBuf = dir.join(relative);
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| DeployError::Template { path, source })?;
            sources.push((relative, content));
        }
        Ok(Self { sources })
    }

    /// Every file of the deployment, with `data_ts` as `src/data.ts`.
    pub fn files(&self, theme: ReportTheme, data_ts: &str) -> Vec<DeployFile> {
        let mut files = vec![
            DeployFile::new("index.html", index_html(theme)),
            DeployFile::new("package.json", package_json(theme)),
            DeployFile::new("vite.config.ts", VITE_CONFIG),
            DeployFile::new("tsconfig.json", tsconfig_json()),
            DeployFile::new("src/main.tsx", MAIN_TSX),
            DeployFile::new("src/vite-env.d.ts", VITE_ENV),
            DeployFile::new("src/index.css", INDEX_CSS),
        ];
        files.extend(
            self.sources
                .iter()
                .map(|(relative, content)| DeployFile::new(format!("src/{relative}"), content.as_str())),
        );
        files.push(DeployFile::new("src/data.ts", data_ts));
        files
    }
}

pub fn index_html(theme: ReportTheme) -> String {
    let title = theme.category_theme().page_title;
    format!(
        r#"<!doctype html>
<html lang="ko">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
    <link rel="stylesheet" as="style" crossorigin href="https://cdn.jsdelivr.net/gh/orioncactus/pretendard@v1.3.9/dist/web/static/pretendard.min.css" />
    <link href="https://fonts.cdnfonts.com/css/caviar-dreams" rel="stylesheet">
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>"#
    )
}

pub fn package_json(theme: ReportTheme) -> String {
    let manifest = json!({
        "name": theme.project_prefix(),
        "private": true,
        "version": "1.0.0",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc -b && vite build",
            "preview": "vite preview"
        },
        "dependencies": {
            "lucide-react": "^0.563.0",
            "react": "^19.2.0",
            "react-dom": "^19.2.0",
            "recharts": "^3.7.0"
        },
        "devDependencies": {
            "@tailwindcss/vite": "^4.1.18",
            "@types/react": "^19.2.5",
            "@types/react-dom": "^19.2.3",
            "@vitejs/plugin-react": "^5.1.1",
            "tailwindcss": "^4.1.18",
            "typescript": "~5.9.3",
            "vite": "^7.2.4"
        }
    });
    serde_json::to_string_pretty(&manifest).unwrap_or_default()
}

fn tsconfig_json() -> String {
    let config = json!({
        "compilerOptions": {
            "target": "ES2020",
            "useDefineForClassFields": true,
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "skipLibCheck": true,
            "moduleResolution": "bundler",
            "allowImportingTsExtensions": true,
            "isolatedModules": true,
            "moduleDetection": "force",
            "noEmit": true,
            "jsx": "react-jsx",
            "strict": true,
            "noUnusedLocals": false,
            "noUnusedParameters": false,
            "noFallthroughCasesInSwitch": true,
            "noUncheckedSideEffectImports": true
        },
        "include": ["src"]
    });
    serde_json::to_string_pretty(&config).unwrap_or_default()
}

const VITE_CONFIG: &str = r#"import { defineConfig } from 'vite'
import react from '@vitejs/plugin-react'
import tailwindcss from '@tailwindcss/vite'

export default defineConfig({
  plugins: [react(), tailwindcss()],
})"#;

const VITE_ENV: &str = "/// <reference types=\"vite/client\" />\n";

const MAIN_TSX: &str = r#"import { StrictMode } from 'react'
import { createRoot } from 'react-dom/client'
import './index.css'
import App from './App.tsx'

createRoot(document.getElementById('root')!).render(
  <StrictMode>
    <App />
  </StrictMode>,
)"#;

const INDEX_CSS: &str = r#"@import "tailwindcss";

@theme {
  --font-sans: 'Pretendard', -apple-system, BlinkMacSystemFont, system-ui, Roboto, sans-serif;
  --font-logo: 'Caviar Dreams', sans-serif;

  --color-olive-50: #f7f7f0;
  --color-olive-100: #eeefdc;
  --color-olive-200: #dde0b9;
  --color-olive-300: #c5c88d;
  --color-olive-400: #a4a75f;
  --color-olive-500: #7c7d35;
  --color-olive-600: #636529;
  --color-olive-700: #4d4e20;
  --color-olive-800: #3d3e1a;
  --color-olive-900: #2d2e14;

  --color-slate-850: #151f32;
}

body {
  font-family: var(--font-sans);
  background-color: #F8FAFC;
  -webkit-font-smoothing: antialiased;
  word-break: keep-all;
}

::-webkit-scrollbar {
  width: 8px;
  height: 8px;
}
::-webkit-scrollbar-track {
  background: transparent;
}
::-webkit-scrollbar-thumb {
  background: #cbd5e1;
  border-radius: 4px;
}"#;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Write a minimal template directory under the system temp dir.
    pub(crate) fn template_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("report-forge-template-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("components")).unwrap();
        for relative in TEMPLATE_SOURCES {
            std::fs::write(dir.join(relative), format!("// {relative}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn test_index_html_title_follows_theme() {
        assert!(index_html(ReportTheme::Beauty).contains("<title>Celebeauty Report</title>"));
        assert!(index_html(ReportTheme::Food).contains("<title>Celebfood Report</title>"));
    }

    #[test]
    fn test_package_name_follows_theme() {
        let manifest: serde_json::Value = serde_json::from_str(&package_json(ReportTheme::Beauty)).unwrap();
        assert_eq!(manifest["name"], "celebeauty-report");
        assert_eq!(manifest["scripts"]["build"], "tsc -b && vite build");
    }

    #[tokio::test]
    async fn test_bundle_lists_every_file() {
        let dir = template_dir();
        let bundle = TemplateBundle::load(&dir).await.unwrap();
        let files = bundle.files(ReportTheme::Food, "export const reportData = {};");

        let names: Vec<_> = files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(
            names,
            [
                "index.html",
                "package.json",
                "vite.config.ts",
                "tsconfig.json",
                "src/main.tsx",
                "src/vite-env.d.ts",
                "src/index.css",
                "src/App.tsx",
                "src/types.ts",
                "src/theme.ts",
                "src/components/Icons.tsx",
                "src/components/Logo.tsx",
                "src/data.ts",
            ]
        );
        assert_eq!(files[7].data, "// App.tsx\n");
        assert_eq!(files[12].data, "export const reportData = {};");
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_missing_template_file() {
        let dir = template_dir();
        std::fs::remove_file(dir.join("types.ts")).unwrap();
        let err = TemplateBundle::load(&dir).await.unwrap_err();
        assert!(matches!(err, DeployError::Template { ref path, .. } if path.ends_with("types.ts")));
        std::fs::remove_dir_all(dir).ok();
    }
}

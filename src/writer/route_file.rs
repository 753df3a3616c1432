//! Routen-Datei (`.trk`) und Kopie der Vorlagen-Route.

use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result};

use super::{RouteWriter, StfOutput};

/// Dateien der Vorlage, die der Writer selbst erzeugt
const GENERATED_EXTENSIONS: [&str; 3] = ["w", "tdb", "trk"];

impl RouteWriter<'_> {
    /// Vorlagen-Route aus den Optionen
    pub fn template_folder(&self) -> Option<PathBuf> {
        self.options().template_folder.clone()
    }

    /// Schreibt `<route>.trk`.
    pub fn write_track_file(&self) -> Result<()> {
        let path = self.directory().join(format!("{}.trk", self.base_name()));
        let origin = self.origin_tile();
        let mut f = StfOutput::create(&path, "r1", self.options().line_ending);
        f.write(&format!(
            "
Tr_RouteFile (
    RouteID ( {name} )
    Name ( {name} )
    Description ( \"\" )
    Graphic ( graphic.ace )
    LoadingScreen ( load.ace )
    FileName ( {name} )
    Electrified ( 00000000 )
    Mountains ( 00000000 )
    OverheadWireHeight ( 0 )
    PassengerRuleSet ( 0 )
    FreightRuleSet ( 0 )
    SignalSet ( 0 )
    GantrySet ( 0 )
    TrackGauge ( 0 )
    Era ( 0 )
    SpeedLimit ( 44.444443 )
    Environment (
        SpringClear ( sun.env )
        SpringRain ( rain.env )
        SpringSnow ( snow.env )
        SummerClear ( sun.env )
        SummerRain ( rain.env )
        SummerSnow ( snow.env )
        AutumnClear ( sun.env )
        AutumnRain ( rain.env )
        AutumnSnow ( snow.env )
        WinterClear ( sun.env )
        WinterRain ( rain.env )
        WinterSnow ( snow.env )
    )
    TerrainErrorScale ( 1 )
    RouteStart ( {tile_x} {tile_z} 0 0 )
    MilepostUnitsKilometers ( )
    DefaultCrossingSMS ( crossing.sms )
    DefaultSignalSMS ( signal.sms )
    DefaultWaterTowerSMS ( wtower.sms )
    DefaultCoalTowerSMS ( ctower.sms )
    DefaultDieselTowerSMS ( dtower.sms )
    TempRestrictedSpeed ( 0 )
    ORTSUserPreferenceForestClearDistance ( 0 )
)
",
            name = self.base_name(),
            tile_x = origin.0,
            tile_z = origin.1,
        ))?;
        f.finish()
            .with_context(|| format!("Routen-Datei nicht schreibbar: {}", path.display()))?;
        Ok(())
    }

    /// Legt das Routen-Verzeichnis aus der Vorlage an.
    ///
    /// Ein vorhandenes Verzeichnis bleibt unverändert, außer bei `overwrite`.
    /// Ohne Vorlage werden nur die Verzeichnisse angelegt.
    pub fn copy_route_template(&self, overwrite: bool) -> Result<()> {
        let directory = self.directory();
        let Some(template) = self.template_folder() else {
            log::warn!(
                "Keine Vorlagen-Route konfiguriert, {} enthält nur erzeugte Dateien",
                directory.display()
            );
            std::fs::create_dir_all(directory).with_context(|| {
                format!("Routen-Verzeichnis nicht anlegbar: {}", directory.display())
            })?;
            return Ok(());
        };

        let exists = directory.exists();
        if exists && !overwrite {
            log::debug!("Routen-Verzeichnis existiert bereits: {}", directory.display());
            return Ok(());
        }
        if exists {
            std::fs::remove_dir_all(directory).with_context(|| {
                format!("Routen-Verzeichnis nicht löschbar: {}", directory.display())
            })?;
        }
        copy_template_tree(&template, directory, self.base_name())?;
        log::info!(
            "Vorlage {} nach {} kopiert",
            template.display(),
            directory.display()
        );
        Ok(())
    }
}

/// Rekursive Kopie; erzeugte Dateitypen werden übersprungen, `.rdb` erhält den Routennamen.
fn copy_template_tree(source: &FsPath, target: &FsPath, base_name: &str) -> Result<()> {
    std::fs::create_dir_all(target)
        .with_context(|| format!("Verzeichnis nicht anlegbar: {}", target.display()))?;
    let entries = std::fs::read_dir(source)
        .with_context(|| format!("Vorlage nicht lesbar: {}", source.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            copy_template_tree(&path, &target.join(entry.file_name()), base_name)?;
            continue;
        }
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if GENERATED_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }
        let destination = if extension == "rdb" {
            target.join(format!("{}.rdb", base_name))
        } else {
            target.join(entry.file_name())
        };
        std::fs::copy(&path, &destination)
            .with_context(|| format!("Kopieren fehlgeschlagen: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_copy_skips_generated_files_and_renames_rdb() {
        let root = std::env::temp_dir().join("or_route_builder_template_copy");
        let _ = std::fs::remove_dir_all(&root);
        let source = root.join("template");
        std::fs::create_dir_all(source.join("tiles")).expect("Vorlage");
        std::fs::write(source.join("template.rdb"), "rdb").expect("rdb");
        std::fs::write(source.join("old.trk"), "trk").expect("trk");
        std::fs::write(source.join("sigcfg.dat"), "cfg").expect("cfg");
        std::fs::write(source.join("tiles").join("template.t"), "t").expect("t");

        let target = root.join("strecke");
        copy_template_tree(&source, &target, "strecke").expect("Kopie");

        assert!(target.join("strecke.rdb").exists());
        assert!(!target.join("template.rdb").exists());
        assert!(!target.join("old.trk").exists());
        assert!(target.join("sigcfg.dat").exists());
        assert!(target.join("tiles").join("template.t").exists());
        let _ = std::fs::remove_dir_all(&root);
    }
}

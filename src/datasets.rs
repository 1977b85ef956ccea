use crate::{
    constants::{
        localization::{
            MALFORMED_MENU_MSG, PARSED_FILE_MSG, SCRIPT_FAILED_MSG,
            WROTE_FILE_MSG,
        },
        *,
    },
    functions::{escape_csv_item, join_lines, write_with_bom},
    game::{GameFileSystem, LanguageSource, TranslationLookup},
    menu::MenuHeader,
    script::{ParsedScript, ScriptDocument, ScriptParser},
    table::{ColumnProjection, CsvSink, RowEntries, Table, TableEntry, TableExtractor},
    types::{DumpOptions, Error},
};
use indexmap::{IndexMap, IndexSet, map::Entry};
use log::{info, warn};
use smallvec::smallvec;
use std::{
    collections::{BTreeMap, HashSet, btree_map},
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

/// Everything one dump run reads from and writes to.
///
/// Owned by a single run. State shared between procedures, like the number of translated lines, lives here.
pub(crate) struct DumpContext<'a> {
    pub files: &'a dyn GameFileSystem,
    pub translations: &'a dyn TranslationLookup,
    pub language_sources: &'a [&'a dyn LanguageSource],
    pub options: DumpOptions,
    pub output_root: &'a Path,
    pub translated_lines: usize,
}

impl DumpContext<'_> {
    fn create_dir(path: &Path) -> Result<(), Error> {
        create_dir_all(path).map_err(|e| Error::Io(path.to_path_buf(), e))
    }

    fn ui_dir(&self, name: &str) -> Result<PathBuf, Error> {
        let path = self.output_root.join(UI_DIR).join(name);
        Self::create_dir(&path)?;
        Ok(path)
    }

    fn extractor(&self) -> TableExtractor<'_> {
        TableExtractor::new(self.translations, self.options.skip_translated_items)
    }

    fn table(&self, name: &str) -> Result<Box<dyn Table>, Error> {
        self.files.open_table(name)
    }

    fn extract_columns(
        &self,
        sink: &mut CsvSink,
        file: &str,
        file_key: &str,
        projection: &ColumnProjection,
    ) -> Result<(), Error> {
        let table = self.table(file)?;
        self.extractor()
            .extract_columns(sink, table.as_ref(), file_key, projection)?;
        Ok(())
    }

    fn extract_rows<F>(
        &self,
        sink: &mut CsvSink,
        file: &str,
        file_key: &str,
        project: F,
    ) -> Result<(), Error>
    where
        F: FnMut(&dyn Table, usize) -> RowEntries,
    {
        let table = self.table(file)?;
        self.extractor()
            .extract(sink, table.as_ref(), file_key, project)?;
        Ok(())
    }

    fn finish(sink: CsvSink) -> Result<(), Error> {
        let path = sink.finish()?;
        info!("{WROTE_FILE_MSG} {}", path.display());
        Ok(())
    }

    fn read_script(&self, name: &str) -> Result<ScriptDocument, Error> {
        Ok(ScriptDocument::from_bytes(name, &self.files.read_file(name)?))
    }

    pub fn dump_ui(&mut self) -> Result<(), Error> {
        info!("Dumping UI localisation");
        info!("There are {} language sources", self.language_sources.len());

        for source in self.language_sources {
            info!(
                "Dumping {} with languages: {}",
                source.name(),
                source.languages().join(",")
            );

            let source_dir = self.ui_dir(source.name())?;

            for category in source.categories() {
                let path = source_dir.join(format!("{category}.csv"));

                if let Some(parent) = path.parent() {
                    Self::create_dir(parent)?;
                }

                write_with_bom(&path, &source.export_csv(&category))?;
            }
        }

        Ok(())
    }

    pub fn dump_scripts(&mut self) -> Result<(), Error> {
        info!("Dumping game script translations...");

        let scripts = self.files.list_files(SCRIPT_EXTENSION);
        info!("Found {} scripts!", scripts.len());

        let script_dir = self.output_root.join(SCRIPT_DIR);
        Self::create_dir(&script_dir)?;

        let parser = ScriptParser::new()
            .subtitle_files(self.files)
            .trace(self.options.debug);

        let mut files_to_skip: HashSet<String> = HashSet::new();
        let mut parsed_scripts: Vec<(ScriptDocument, ParsedScript)> =
            Vec::with_capacity(scripts.len());

        // Companion targets must all be known before anything is written.
        for name in &scripts {
            let result = self.read_script(name).and_then(|document| {
                let parsed = parser.parse(&document)?;
                Ok((document, parsed))
            });

            match result {
                Ok((document, parsed)) => {
                    files_to_skip.extend(
                        parsed
                            .companion_files
                            .iter()
                            .map(|file| file.to_lowercase()),
                    );
                    parsed_scripts.push((document, parsed));
                }
                Err(err) => warn!("{SCRIPT_FAILED_MSG} {name}: {err}"),
            }
        }

        let mut npc_names: IndexMap<String, String> = IndexMap::new();

        for (document, parsed) in &parsed_scripts {
            if files_to_skip.contains(&document.stem().to_lowercase()) {
                continue;
            }

            if let Err(err) = self.extract_script(
                document,
                parsed,
                &script_dir,
                &mut npc_names,
            ) {
                warn!("{SCRIPT_FAILED_MSG} {}: {err}", document.name);
            }
        }

        let names_path = script_dir.join(NPC_NAMES_FILE);
        write_with_bom(
            &names_path,
            &join_lines(
                npc_names
                    .iter()
                    .map(|(source, translation)| format!("{source}\t{translation}")),
            ),
        )?;

        Ok(())
    }

    fn extract_script(
        &mut self,
        document: &ScriptDocument,
        parsed: &ParsedScript,
        script_dir: &Path,
        npc_names: &mut IndexMap<String, String>,
    ) -> Result<(), Error> {
        info!("{PARSED_FILE_MSG} {}", document.name);

        self.translated_lines += parsed.translated_lines;
        npc_names.extend(
            parsed
                .npc_names
                .iter()
                .map(|(source, translation)| (source.clone(), translation.clone())),
        );

        let lines = parsed.text_lines()?;

        if lines.is_empty() {
            return Ok(());
        }

        let dir = match Path::new(&document.name).parent() {
            Some(parent) => script_dir.join(parent),
            None => script_dir.to_path_buf(),
        };
        Self::create_dir(&dir)?;

        write_with_bom(
            dir.join(format!("{}.txt", document.stem())),
            &join_lines(lines),
        )
    }

    pub fn dump_scripts_json(&mut self) -> Result<(), Error> {
        info!("Collecting .ks scripts for the source cache...");

        let scripts = self.files.list_files(SCRIPT_EXTENSION);
        info!("Found {} scripts", scripts.len());

        let parser = ScriptParser::new().trace(self.options.debug);
        let mut cache: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for name in &scripts {
            let document = match self.read_script(name) {
                Ok(document) => document,
                Err(err) => {
                    warn!("{SCRIPT_FAILED_MSG} {name}: {err}");
                    continue;
                }
            };

            let sources = parser.parse(&document)?.source_strings();

            if !sources.is_empty() && !self.options.debug {
                info!("{}: {} lines.", document.file_name(), sources.len());
            }

            match cache.entry(document.file_name().to_owned()) {
                btree_map::Entry::Occupied(mut entry) => {
                    let merged: IndexSet<String> =
                        entry.get().iter().cloned().chain(sources).collect();
                    *entry.get_mut() = merged.into_iter().collect();
                }
                btree_map::Entry::Vacant(entry) => {
                    if !sources.is_empty() {
                        entry.insert(sources);
                    }
                }
            }
        }

        Self::create_dir(self.output_root)?;

        let path = self.output_root.join(JP_CACHE_FILE);
        let json = serde_json::to_string_pretty(&cache)?;
        write(&path, json).map_err(|e| Error::Io(path.clone(), e))?;

        info!("{WROTE_FILE_MSG} {}", path.display());
        Ok(())
    }

    pub fn dump_item_names(&mut self) -> Result<(), Error> {
        let dir = self.ui_dir(ITEM_NAMES_DIR)?;

        info!("Getting all .menu files (this might take a moment)...");
        let menus = self.files.list_files(MENU_EXTENSION);
        info!("Found {} menus!", menus.len());

        let mut sinks: IndexMap<String, CsvSink> = IndexMap::new();

        for menu in &menus {
            let data = self.files.read_file(menu)?;

            let header = match MenuHeader::parse(menu, &data) {
                Ok(header) => header,
                Err(err) => {
                    warn!("{MALFORMED_MENU_MSG}: {err}");
                    continue;
                }
            };

            let file_name = menu.rsplit(['/', '\\']).next().unwrap_or(menu);
            let stem = Path::new(file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();

            let sink = match sinks.entry(header.category.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(CsvSink::create(
                    dir.join(format!("{}.csv", header.category)),
                )?),
            };

            if self.options.skip_translated_items
                && self
                    .translations
                    .try_get_translation(&format!(
                        "{}/{stem}|name",
                        header.category
                    ))
                    .is_some()
            {
                continue;
            }

            sink.write_plain_entry(&format!("{stem}|name"), &header.name, &header.name)?;
            sink.write_plain_entry(&format!("{stem}|info"), &header.info, &header.info)?;
        }

        for (_, sink) in sinks {
            Self::finish(sink)?;
        }

        Ok(())
    }

    pub fn dump_maid_status(&mut self) -> Result<(), Error> {
        info!("Getting Maid's Status");

        let dir = self.ui_dir(MAID_STATUS_DIR)?;
        let mut sink = CsvSink::create(dir.join("MaidStatus.csv"))?;

        let lists: [(&str, &str, usize, usize); 6] = [
            ("maid_status_personal_list.nei", "性格タイプ", 2, 1),
            ("maid_status_yotogiclass_list.nei", "夜伽クラス", 2, 1),
            ("maid_status_jobclass_list.nei", "ジョブクラス", 2, 1),
            ("maid_status_jobclass_list.nei", "ジョブクラス/説明", 4, 1),
            ("maid_status_title_list.nei", "ステータス称号", 0, 0),
            ("maid_status_feature_list.nei", "特徴タイプ", 1, 1),
        ];

        for (file, prefix, data_column, id_column) in lists {
            self.extract_rows(&mut sink, file, "MaidStatus", |table, row| {
                smallvec![TableEntry::new(
                    format!("{prefix}/{}", table.string(id_column, row)),
                    table.string(data_column, row),
                )]
            })?;
        }

        Self::finish(sink)
    }

    pub fn dump_yotogi(&mut self) -> Result<(), Error> {
        info!("Getting yotogi skills and commands");

        let dir = self.ui_dir(YOTOGI_DIR)?;

        let mut skills = CsvSink::create(dir.join("YotogiSkillName.csv"))?;
        self.extract_rows(
            &mut skills,
            "yotogi_skill_list.nei",
            "YotogiSkillName",
            |table, row| {
                let name = table.string(4, row);
                smallvec![TableEntry::new(name.clone(), name)]
            },
        )?;
        Self::finish(skills)?;

        let mut commands = CsvSink::create(dir.join("YotogiSkillCommand.csv"))?;
        self.dump_yotogi_commands(&mut commands)?;
        Self::finish(commands)?;

        let mut stages = CsvSink::create(dir.join("SceneYotogi.csv"))?;
        self.extract_columns(
            &mut stages,
            "yotogi_stage_list.nei",
            "SceneYotogi",
            &ColumnProjection::new([(2, "背景タイプ/")]),
        )?;
        Self::finish(stages)
    }

    /// Command names are in column 2, with command groups separated by a blank row and two rows of group data.
    fn dump_yotogi_commands(&self, sink: &mut CsvSink) -> Result<(), Error> {
        let table = self.table("yotogi_skill_command_data.nei")?;
        let mut row: usize = 0;

        while row < table.rows() {
            if !table.has_data(2, row) {
                row += 3;
                continue;
            }

            let name = table.string(2, row);
            row += 1;

            if self.options.skip_translated_items
                && self
                    .translations
                    .try_get_translation(&format!("YotogiSkillCommand/{name}"))
                    .is_some()
            {
                continue;
            }

            if !sink.claim_key(&name) {
                continue;
            }

            let escaped = escape_csv_item(&name);
            sink.write_line(&format!("{escaped},{CSV_TEXT_TYPE},,{escaped},"))?;
        }

        Ok(())
    }

    pub fn dump_scenario_events(&mut self) -> Result<(), Error> {
        info!("Getting scenario event data");

        let dir = self.ui_dir(SCENARIO_EVENTS_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneScenarioSelect.csv"))?;
        let file_key = "SceneScenarioSelect";

        self.extract_rows(&mut sink, "select_scenario_data.nei", file_key, |table, row| {
            let id = table.integer(0, row);
            smallvec![
                TableEntry::new(format!("{id}/タイトル"), table.string(1, row)),
                TableEntry::new(format!("{id}/内容"), table.string(2, row)),
            ]
        })?;

        self.extract_rows(&mut sink, "select_scenario_data.nei", file_key, |table, row| {
            table
                .string(22, row)
                .split('\n')
                .map(|condition| TableEntry::new(format!("条件文/{condition}"), condition))
                .collect()
        })?;

        Self::finish(sink)
    }

    pub fn dump_honeymoon_events(&mut self) -> Result<(), Error> {
        info!("Getting Honeymoon event data");

        let dir = self.ui_dir(HONEYMOON_EVENTS_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneHoneymoonMode.csv"))?;
        let file = "honeymoonmode_event_list.nei";
        let file_key = "SceneHoneymoonMode";

        self.extract_columns(&mut sink, file, file_key, &ColumnProjection::new([(1, "場所名/")]))?;
        self.extract_columns(
            &mut sink,
            file,
            file_key,
            &ColumnProjection::new([(4, "イベント名/")]).keyed_by(0),
        )?;

        Self::finish(sink)
    }

    pub fn dump_private_mode_events(&mut self) -> Result<(), Error> {
        info!("Getting Private mode event data");

        let dir = self.ui_dir(PRIVATE_MODE_EVENTS_DIR)?;
        let mut sink = CsvSink::create(dir.join("ScenePrivate.csv"))?;
        let file_key = "ScenePrivate";

        let information = "private_maidmode_eventinformation_list.nei";
        self.extract_rows(&mut sink, information, file_key, |table, row| {
            smallvec![TableEntry::new(
                format!("イベントタイトル/{}", table.integer(0, row)),
                table.string(1, row),
            )]
        })?;
        self.extract_columns(
            &mut sink,
            information,
            file_key,
            &ColumnProjection::new([(2, "イベントテキスト/")]),
        )?;

        let groups = "private_maidmode_group_list.nei";
        self.extract_columns(
            &mut sink,
            groups,
            file_key,
            &ColumnProjection::new([(2, "ロケーション名/")]),
        )?;
        self.extract_columns(&mut sink, groups, file_key, &ColumnProjection::new([(1, "背景/")]))?;

        Self::finish(sink)
    }

    pub fn dump_memory(&mut self) -> Result<(), Error> {
        info!("Getting Memory data");

        let dir = self.ui_dir(MEMORY_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneFreeModeSelect.csv"))?;
        let file_key = "SceneFreeModeSelect";

        let recollections = ["recollection_story.nei", "recollection_normal2.nei"];
        let titles = ColumnProjection::new([(1, "タイトル/"), (5, "説明/")]).keyed_by(1);
        let conditions = ColumnProjection::new([(6, "条件文/")]);

        for file in recollections {
            self.extract_columns(&mut sink, file, file_key, &titles)?;
        }

        for file in recollections {
            self.extract_columns(&mut sink, file, file_key, &conditions)?;
        }

        let life_mode = "recollection_life_mode.nei";
        self.extract_columns(
            &mut sink,
            life_mode,
            file_key,
            &ColumnProjection::new([(2, "タイトル/"), (4, "説明/")]),
        )?;
        self.extract_columns(
            &mut sink,
            life_mode,
            file_key,
            &ColumnProjection::new((5..=7).map(|column| (column, "条件文/"))),
        )?;

        Self::finish(sink)
    }

    pub fn dump_schedule(&mut self) -> Result<(), Error> {
        info!("Getting schedule.");

        let dir = self.ui_dir(SCHEDULE_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneDaily.csv"))?;
        let file_key = "SceneDaily";

        let title = "スケジュール/項目/";
        let description = "スケジュール/説明/";

        // Conditions go after titles and descriptions.
        let works: [(&str, ColumnProjection); 7] = [
            ("schedule_work_night.nei", ColumnProjection::new([(1, title)])),
            (
                "schedule_work_night.nei",
                ColumnProjection::new([(7, description)]).keyed_by(1),
            ),
            (
                "schedule_work_night.nei",
                ColumnProjection::new((12..=20).map(|column| (column, "スケジュール/条件文/"))),
            ),
            ("schedule_work_noon.nei", ColumnProjection::new([(1, title)])),
            ("schedule_work_easyyotogi.nei", ColumnProjection::new([(1, title)])),
            (
                "schedule_work_easyyotogi.nei",
                ColumnProjection::new([(5, description)]).keyed_by(1),
            ),
            (
                "schedule_work_night_category_list.nei",
                ColumnProjection::new([(1, "スケジュール/カテゴリー/")]),
            ),
        ];

        for (file, projection) in &works {
            self.extract_columns(&mut sink, file, file_key, projection)?;
        }

        Self::finish(sink)
    }

    pub fn dump_trophy(&mut self) -> Result<(), Error> {
        info!("Getting Trophy data");

        let dir = self.ui_dir(TROPHY_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneTrophy.csv"))?;

        self.extract_rows(&mut sink, "trophy_list.nei", "SceneTrophy", |table, row| {
            let id = table.integer(0, row);
            smallvec![
                TableEntry::new(format!("{id}/トロフィー名"), table.string(2, row)),
                TableEntry::new(format!("{id}/説明"), table.string(8, row)),
            ]
        })?;

        Self::finish(sink)
    }

    pub fn dump_npc(&mut self) -> Result<(), Error> {
        info!("Getting NPC data");

        let dir = self.ui_dir(NPC_EDIT_DIR)?;

        let mut maids = CsvSink::create(dir.join("SceneNPCEdit.csv"))?;
        self.extract_rows(&mut maids, "npcedit_list.nei", "SceneNPCEdit", |table, row| {
            let id = table.integer(0, row);
            let name = table.string(1, row);
            smallvec![
                TableEntry::new(format!("{id}/苗字"), name.clone()),
                TableEntry::new(format!("{id}/名前"), name),
                TableEntry::new(format!("{id}/説明"), table.string(6, row)),
            ]
        })?;
        Self::finish(maids)?;

        let mut sub_maids = CsvSink::create(dir.join("SubMaid.csv"))?;
        self.extract_rows(
            &mut sub_maids,
            "maid_status_submaid_list.nei",
            "SubMaid",
            |table, row| {
                let name = table.string(1, row);
                smallvec![
                    TableEntry::new(format!("{name}/性格"), table.string(11, row)),
                    TableEntry::new(format!("{name}/状態"), table.string(12, row)),
                ]
            },
        )?;
        Self::finish(sub_maids)
    }

    pub fn dump_guest(&mut self) -> Result<(), Error> {
        info!("Getting guest mode data");

        let dir = self.ui_dir(GUEST_MODE_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneKasizukiMainMenu.csv"))?;
        let file_key = "SceneKasizukiMainMenu";

        self.extract_columns(
            &mut sink,
            "kasizuki_man_list.nei",
            file_key,
            &ColumnProjection::new([(2, "男名/"), (4, "男プロフ/"), (5, "男好プレイ/")])
                .keyed_by(1),
        )?;

        sink.write_line(ROOMS_SEPARATOR)?;
        self.extract_columns(
            &mut sink,
            "kasizuki_room_list.nei",
            file_key,
            &ColumnProjection::new([(5, "部屋名/"), (7, "部屋説明/")]).keyed_by(5),
        )?;

        sink.write_line(SCENARIOS_SEPARATOR)?;
        self.extract_columns(
            &mut sink,
            "kasizuki_play_list.nei",
            file_key,
            &ColumnProjection::new([(3, "プレイタイトル/"), (4, "プレイ内容/")]).keyed_by(0),
        )?;

        sink.write_line(CONDITIONS_SEPARATOR)?;
        self.extract_columns(
            &mut sink,
            "kasizuki_play_list.nei",
            file_key,
            &ColumnProjection::new((5..=10).map(|column| (column, "プレイ条件/"))),
        )?;

        Self::finish(sink)
    }

    pub fn dump_dance(&mut self) -> Result<(), Error> {
        info!("Getting Dance data");

        let dir = self.ui_dir(DANCE_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneDanceSelect.csv"))?;

        self.extract_rows(&mut sink, "dance_setting.nei", "SceneDanceSelect", |table, row| {
            let id = table.integer(0, row);
            smallvec![
                TableEntry::new(format!("曲名/{id}"), table.string(1, row)),
                TableEntry::new(format!("曲説明/{id}"), table.string(6, row)),
            ]
        })?;

        Self::finish(sink)
    }

    pub fn dump_mansion(&mut self) -> Result<(), Error> {
        info!("Getting mansion mode data");

        let dir = self.ui_dir(MANSION_DIR)?;
        let mut sink = CsvSink::create(dir.join("SceneTeikokusou.csv"))?;

        self.extract_rows(
            &mut sink,
            "teikokusoumode_playmode_list.nei",
            "SceneTeikokusou",
            |table, row| {
                let id = table.integer(0, row);
                smallvec![
                    TableEntry::new(format!("部屋名/{id}"), table.string(1, row)),
                    TableEntry::new(format!("部屋ゲスト名/{id}"), table.string(2, row)),
                    TableEntry::new(
                        format!("部屋プロフィールコメント/{id}"),
                        table.string(9, row),
                    ),
                ]
            },
        )?;

        Self::finish(sink)
    }
}

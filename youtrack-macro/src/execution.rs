use std::collections::BTreeMap;

use tracing::{debug, warn};
use youtrack_client::IssueFetcher;
use youtrack_config::YouTrackConfig;
use youtrack_domain::{Result, YouTrackError};

use crate::{
    block::Block,
    displayer::{
        normalize_fields, EnumDisplayer, FieldDisplayerRegistry, IssueDisplayer, ListDisplayer,
        TableDisplayer,
    },
    parameters::MacroParameters,
    source::{DataSource, ListDataSource, QueryDataSource, QueryKind, SourceContext},
    telemetry,
};

pub const ERROR_MESSAGE: &str = "Failed to execute the YouTrack macro";

pub struct YouTrackMacro {
    config: YouTrackConfig,
    fetcher: Box<dyn IssueFetcher>,
    sources: BTreeMap<String, Box<dyn DataSource>>,
    styles: BTreeMap<String, Box<dyn IssueDisplayer>>,
    field_displayers: FieldDisplayerRegistry,
}

impl YouTrackMacro {
    pub fn new(config: YouTrackConfig, fetcher: Box<dyn IssueFetcher>) -> Self {
        let mut youtrack = Self {
            config,
            fetcher,
            sources: BTreeMap::new(),
            styles: BTreeMap::new(),
            field_displayers: FieldDisplayerRegistry::default(),
        };
        youtrack.register_source("list", Box::new(ListDataSource));
        youtrack.register_source("jql", Box::new(QueryDataSource::new(QueryKind::Jql)));
        youtrack.register_source("search", Box::new(QueryDataSource::new(QueryKind::Search)));
        youtrack.register_style("table", Box::new(TableDisplayer));
        youtrack.register_style("list", Box::new(ListDisplayer));
        youtrack.register_style("enum", Box::new(EnumDisplayer));
        youtrack
    }

    pub fn register_source(&mut self, name: impl Into<String>, source: Box<dyn DataSource>) {
        self.sources.insert(name.into(), source);
    }

    pub fn register_style(&mut self, name: impl Into<String>, displayer: Box<dyn IssueDisplayer>) {
        self.styles.insert(name.into(), displayer);
    }

    pub fn field_displayers_mut(&mut self) -> &mut FieldDisplayerRegistry {
        &mut self.field_displayers
    }

    pub fn config(&self) -> &YouTrackConfig {
        &self.config
    }

    pub fn execute(&self, parameters: &MacroParameters, content: &str) -> Result<Vec<Block>> {
        let displayer = self.styles.get(&parameters.style).ok_or_else(|| {
            YouTrackError::configuration(format!("Unknown YouTrack style [{}]", parameters.style))
        })?;
        let source = self.sources.get(&parameters.source).ok_or_else(|| {
            YouTrackError::configuration(format!("Unknown YouTrack source [{}]", parameters.source))
        })?;

        let context = SourceContext {
            config: &self.config,
            fetcher: self.fetcher.as_ref(),
        };
        let issues = telemetry::timed("fetch", Some(parameters.source.as_str()), || {
            source.get_data(content, parameters, &context)
        })?;
        debug!(
            source = %parameters.source,
            style = %parameters.style,
            issues = issues.len(),
            "rendering YouTrack issues"
        );

        let fields = normalize_fields(parameters, displayer.default_fields());
        telemetry::timed("display", Some(parameters.style.as_str()), || {
            displayer.display(&issues, &fields, parameters, &self.field_displayers)
        })
    }

    /// Like [`YouTrackMacro::execute`], but failures come back as an error
    /// block so the host page still renders.
    pub fn render(&self, parameters: &MacroParameters, content: &str, inline: bool) -> Vec<Block> {
        self.execute(parameters, content).unwrap_or_else(|error| {
            warn!(error = %error, "YouTrack macro failed");
            vec![error_block(&error, inline)]
        })
    }
}

pub fn error_block(error: &YouTrackError, inline: bool) -> Block {
    Block::Error {
        message: ERROR_MESSAGE.to_string(),
        description: error.to_string(),
        inline,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use youtrack_client::search_url;
    use youtrack_domain::{FieldSpec, Issue, YouTrackError};

    use super::{YouTrackMacro, ERROR_MESSAGE};
    use crate::{
        block::Block,
        displayer::FieldDisplayer,
        fixtures::{config, issue_document, server, FakeFetcher},
        parameters::MacroParameters,
        render::to_xwiki,
    };

    fn youtrack(fetcher: FakeFetcher) -> YouTrackMacro {
        YouTrackMacro::new(config(), Box::new(fetcher))
    }

    fn fetcher() -> FakeFetcher {
        FakeFetcher::default()
            .with_issue(issue_document("ISSUE-1", "First", Some("Open")))
            .with_issue(issue_document("ISSUE-2", "Second", Some("Done")))
    }

    #[test]
    fn renders_a_table_of_listed_issues() {
        let parameters = MacroParameters::from_pairs([("fields", "key,summary,state")])
            .expect("parameters");

        let blocks = youtrack(fetcher())
            .execute(&parameters, "ISSUE-2\nISSUE-1")
            .expect("blocks");

        assert_eq!(
            to_xwiki(&blocks),
            "|={{{Key}}}|={{{Summary}}}|={{{state}}}\n\
             |[[image:/resources/icons/silk/accept.png||alt=\"Done\" title=\"Done\"]]\
             [[--{{{ISSUE-2}}}-->>https://yt.example.org/issue/ISSUE-2]]|{{{Second}}}|Done\n\
             |[[image:/resources/icons/silk/page.png||alt=\"Open\" title=\"Open\"]]\
             [[{{{ISSUE-1}}}>>https://yt.example.org/issue/ISSUE-1]]|{{{First}}}|Open"
        );
    }

    #[test]
    fn unknown_style_and_source_are_configuration_errors() {
        let youtrack = youtrack(fetcher());

        let style = MacroParameters::from_pairs([("style", "grid")]).expect("parameters");
        let err = youtrack.execute(&style, "ISSUE-1").expect_err("style");
        assert!(matches!(err, YouTrackError::Configuration(message) if message == "Unknown YouTrack style [grid]"));

        let source = MacroParameters::from_pairs([("source", "rss")]).expect("parameters");
        let err = youtrack.execute(&source, "ISSUE-1").expect_err("source");
        assert!(matches!(err, YouTrackError::Configuration(message) if message == "Unknown YouTrack source [rss]"));
    }

    #[test]
    fn failures_render_as_error_blocks() {
        let blocks = youtrack(fetcher()).render(&MacroParameters::default(), "  ", true);
        assert_eq!(
            blocks,
            vec![Block::Error {
                message: ERROR_MESSAGE.to_string(),
                description: "Empty list of YouTrack ids!".to_string(),
                inline: true,
            }]
        );
    }

    #[test]
    fn search_source_with_enum_style() {
        let url = search_url(&server(), "#Unresolved", None);
        let fetcher = FakeFetcher::default().with_document(
            url,
            json!([issue_document("DEMO-7", "Seven", Some("In Review"))]),
        );
        let parameters =
            MacroParameters::from_pairs([("source", "search"), ("style", "enum")])
                .expect("parameters");

        let blocks = youtrack(fetcher)
            .execute(&parameters, "#Unresolved")
            .expect("blocks");

        assert_eq!(
            to_xwiki(&blocks),
            "[[image:/resources/icons/silk/eye.png||alt=\"In Review\" title=\"In Review\"]] \
             [[image:/resources/icons/silk/eye.png||alt=\"In Review\" title=\"In Review\"]]\
             [[{{{DEMO-7}}}>>https://yt.example.org/issue/DEMO-7]]"
        );
    }

    #[test]
    fn notes_show_up_in_the_list_style() {
        let parameters = MacroParameters::from_pairs([("style", "list"), ("fields", "key:,note")])
            .expect("parameters");
        let blocks = youtrack(fetcher())
            .execute(&parameters, "ISSUE-1|needs QA")
            .expect("blocks");
        assert!(to_xwiki(&blocks).ends_with(" {{{needs QA}}}"));
    }

    struct Shout;

    impl FieldDisplayer for Shout {
        fn display_field(
            &self,
            field: &FieldSpec,
            issue: &Issue,
            _parameters: &MacroParameters,
        ) -> youtrack_domain::Result<Vec<Block>> {
            Ok(vec![Block::word(format!("{}:{}", field.id, issue.id).to_uppercase())])
        }
    }

    #[test]
    fn custom_field_displayers_can_be_registered() {
        let mut youtrack = youtrack(fetcher());
        youtrack
            .field_displayers_mut()
            .register("type/shout", Arc::new(Shout));
        let parameters = MacroParameters::from_pairs([("style", "enum"), ("fields", "summary!shout")])
            .expect("parameters");

        let blocks = youtrack.execute(&parameters, "ISSUE-1").expect("blocks");
        assert_eq!(blocks, vec![Block::word("SUMMARY:ISSUE-1")]);
    }
}

//! Layout units for every screen of an experience.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;

use experience_core::{Experience, ExperienceError, Id};

use crate::measure::MeasurementService;
use crate::screen::ScreenLayout;

/// One [`ScreenLayout`] per screen, keyed by screen id in document order.
#[derive(Debug)]
pub struct ExperienceLayout {
    id: Id,
    home_screen_id: Id,
    screens: IndexMap<Id, ScreenLayout>,
}

impl ExperienceLayout {
    /// Validate `experience` and build every screen's layout unit.
    pub fn new(
        experience: &Experience,
        service: Arc<dyn MeasurementService>,
    ) -> Result<Self, ExperienceError> {
        experience.screen_index()?;

        let mut screens = IndexMap::with_capacity(experience.screens.len());
        for screen in &experience.screens {
            let layout = ScreenLayout::new(screen, Arc::clone(&service))?;
            screens.insert(screen.id.clone(), layout);
        }
        debug!(
            "Experience {} prepared {} screens",
            experience.id,
            screens.len()
        );

        Ok(Self {
            id: experience.id.clone(),
            home_screen_id: experience.home_screen_id.clone(),
            screens,
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn home(&self) -> Option<&ScreenLayout> {
        self.screens.get(&self.home_screen_id)
    }

    pub fn screen(&self, id: &Id) -> Option<&ScreenLayout> {
        self.screens.get(id)
    }

    pub fn screens(&self) -> impl Iterator<Item = &ScreenLayout> {
        self.screens.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::EstimatingMeasurementService;
    use experience_core::{Block, DocumentError, Length, Row, Screen};

    fn service() -> Arc<dyn MeasurementService> {
        Arc::new(EstimatingMeasurementService::default())
    }

    #[test]
    fn test_screens_by_id() {
        let experience = Experience {
            id: "exp".into(),
            home_screen_id: "home".into(),
            screens: vec![
                Screen::new("home").with_row(Row::new("r", Length::points(80.0))),
                Screen::new("detail"),
            ],
        };
        let layout = ExperienceLayout::new(&experience, service()).unwrap();

        let home = layout.home().unwrap();
        assert_eq!(home.id().as_str(), "home");
        assert!((home.render(320.0).total_height - 80.0).abs() < 0.001);
        assert!(layout.screen(&"detail".into()).is_some());
        let ids: Vec<&str> = layout.screens().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["home", "detail"]);
    }

    #[test]
    fn test_missing_home_screen() {
        let experience = Experience {
            id: "exp".into(),
            home_screen_id: "gone".into(),
            screens: vec![Screen::new("home")],
        };
        assert!(matches!(
            ExperienceLayout::new(&experience, service()),
            Err(ExperienceError::Document(DocumentError::MissingHomeScreen { .. }))
        ));
    }

    #[test]
    fn test_invalid_screen_fails_the_experience() {
        let experience = Experience {
            id: "exp".into(),
            home_screen_id: "home".into(),
            screens: vec![Screen::new("home").with_row(
                Row::auto_height("r").with_blocks([Block::rectangle("x"), Block::rectangle("x")]),
            )],
        };
        let err = ExperienceLayout::new(&experience, service()).unwrap_err();
        assert!(matches!(
            err,
            ExperienceError::Document(DocumentError::DuplicateBlockId { .. })
        ));
        assert_eq!(err.to_string(), "Duplicate block id x in screen home");
    }
}

use std::sync::Arc;

use binday_core::{
    model::{
        Advisory, Freshness, Locality, LocalityId, Material, MunicipalEvent, Property,
        PropertyId, Resolution, Street, StreetId,
    },
    service::BinDayService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Setup,
    Dashboard,
    WhichBin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetupStep {
    Locality,
    Street,
    Property,
}

impl SetupStep {
    pub(crate) fn title(self) -> &'static str {
        match self {
            SetupStep::Locality => "Suburb",
            SetupStep::Street => "Street",
            SetupStep::Property => "House number",
        }
    }
}

/// One row of a setup list.
#[derive(Debug, Clone)]
pub(crate) struct Choice {
    pub id: i64,
    pub name: String,
}

impl From<Locality> for Choice {
    fn from(locality: Locality) -> Self {
        Self {
            id: locality.id.0,
            name: locality.name,
        }
    }
}

impl From<Street> for Choice {
    fn from(street: Street) -> Self {
        Self {
            id: street.id.0,
            name: street.name,
        }
    }
}

impl From<Property> for Choice {
    fn from(property: Property) -> Self {
        Self {
            id: property.id.0,
            name: property.name,
        }
    }
}

/// Where the setup flow goes next.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Next {
    Localities,
    Streets(LocalityId),
    Properties(StreetId),
    Dashboard(PropertyId),
}

/// Results delivered by background tasks.
#[derive(Debug)]
pub(crate) enum Update {
    Choices(SetupStep, Result<Vec<Choice>, String>),
    Schedule(PropertyId, Resolution),
    Advisories(Vec<Advisory>),
    Event(Option<MunicipalEvent>),
    Materials(Result<Vec<Material>, String>),
}

pub(crate) struct App {
    pub service: Arc<BinDayService>,

    pub screen: Screen,
    pub setup_step: SetupStep,
    pub choices: Vec<Choice>,
    pub filter: String,
    pub list_index: usize,
    pub locality: Option<Choice>,
    pub street: Option<Choice>,

    pub property: Option<PropertyId>,
    pub resolution: Option<Resolution>,
    pub advisories: Vec<Advisory>,
    pub event: Option<MunicipalEvent>,
    pub refresh_pending: Option<PropertyId>,

    pub query: String,
    pub materials: Vec<Material>,
    pub material_index: usize,

    pub is_loading: bool,
    pub notice: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<BinDayService>) -> Self {
        let property = service.current_config().map(|record| record.property_id);
        let resolution = property.and_then(|_| service.warm_start());
        Self {
            service,
            screen: if property.is_some() {
                Screen::Dashboard
            } else {
                Screen::Setup
            },
            setup_step: SetupStep::Locality,
            choices: Vec::new(),
            filter: String::new(),
            list_index: 0,
            locality: None,
            street: None,
            property,
            resolution,
            advisories: Vec::new(),
            event: None,
            refresh_pending: None,
            query: String::new(),
            materials: Vec::new(),
            material_index: 0,
            is_loading: false,
            notice: None,
            error_message: None,
        }
    }

    /// Setup rows whose name contains the typed filter, ignoring case.
    pub(crate) fn visible_choices(&self) -> Vec<&Choice> {
        let needle = self.filter.to_lowercase();
        self.choices
            .iter()
            .filter(|choice| choice.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub(crate) fn begin_setup(&mut self) {
        self.screen = Screen::Setup;
        self.setup_step = SetupStep::Locality;
        self.locality = None;
        self.street = None;
        self.reset_list();
    }

    pub(crate) fn reset_list(&mut self) {
        self.choices.clear();
        self.filter.clear();
        self.list_index = 0;
    }

    /// Step back one level in the setup chain, `None` when already at the top.
    pub(crate) fn step_back(&mut self) -> Option<Next> {
        let next = match self.setup_step {
            SetupStep::Locality => return None,
            SetupStep::Street => {
                self.setup_step = SetupStep::Locality;
                self.locality = None;
                Next::Localities
            }
            SetupStep::Property => {
                self.setup_step = SetupStep::Street;
                self.street = None;
                let locality = self.locality.as_ref()?;
                Next::Streets(LocalityId(locality.id))
            }
        };
        self.reset_list();
        Some(next)
    }

    /// Take the highlighted row and advance the setup chain.
    pub(crate) fn pick_current(&mut self) -> Option<Next> {
        let choice = self.visible_choices().get(self.list_index).copied().cloned()?;
        let next = match self.setup_step {
            SetupStep::Locality => {
                self.setup_step = SetupStep::Street;
                let next = Next::Streets(LocalityId(choice.id));
                self.locality = Some(choice);
                next
            }
            SetupStep::Street => {
                self.setup_step = SetupStep::Property;
                let next = Next::Properties(StreetId(choice.id));
                self.street = Some(choice);
                next
            }
            SetupStep::Property => {
                let property = PropertyId(choice.id);
                self.property = Some(property);
                self.resolution = None;
                self.advisories.clear();
                self.screen = Screen::Dashboard;
                Next::Dashboard(property)
            }
        };
        self.reset_list();
        Some(next)
    }

    /// Record a schedule request for `property`; false when one for it is already running.
    pub(crate) fn begin_schedule(&mut self, property: PropertyId) -> bool {
        if self.refresh_pending == Some(property) {
            return false;
        }
        self.refresh_pending = Some(property);
        self.is_loading = true;
        true
    }

    pub(crate) fn apply(&mut self, update: Update) {
        self.is_loading = false;
        match update {
            Update::Choices(step, result) => {
                if step != self.setup_step {
                    return;
                }
                match result {
                    Ok(choices) => {
                        self.choices = choices;
                        self.list_index = 0;
                    }
                    Err(err) => self.error_message = Some(err),
                }
            }
            Update::Schedule(property, resolution) => {
                if self.refresh_pending == Some(property) {
                    self.refresh_pending = None;
                }
                if self.property != Some(property) {
                    return;
                }
                self.error_message = resolution.error().map(|err| err.to_string());
                self.notice = (resolution.freshness == Freshness::Cached)
                    .then(|| "Offline - showing cached schedule".to_owned());
                self.resolution = Some(resolution);
            }
            Update::Advisories(advisories) => self.advisories = advisories,
            Update::Event(event) => self.event = event,
            Update::Materials(result) => match result {
                Ok(materials) => {
                    self.materials = materials;
                    self.material_index = 0;
                }
                Err(err) => self.error_message = Some(err),
            },
        }
    }
}

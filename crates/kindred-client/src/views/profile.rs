//! Profile editor, also used for onboarding.

use parking_lot::Mutex;

use kindred_shared::constants::{AVAILABLE_PHOTOS, MAX_PHOTOS};
use kindred_shared::validate::{parse_age, validate_display_name, validate_photo_count};
use kindred_shared::{Field, Gender, Principal, Profile, ValidationError};

use crate::app::App;
use crate::error::{ClientError, Result};
use crate::queries::profile::{CallerProfile, SaveProfile};
use crate::router::Route;

/// Ordered selection over the stock avatars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoPicker {
    selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoOption {
    pub photo: &'static str,
    /// 1-based position in the selection.
    pub order: Option<usize>,
}

impl PhotoPicker {
    pub fn new(selected: Vec<String>) -> Self {
        Self { selected }
    }

    /// Deselect if selected, otherwise append. Returns whether the
    /// selection changed; adding past the limit is a no-op.
    pub fn toggle(&mut self, photo: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|p| p == photo) {
            self.selected.remove(pos);
            return true;
        }
        if self.selected.len() >= MAX_PHOTOS {
            return false;
        }
        self.selected.push(photo.to_string());
        true
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn options(&self) -> Vec<PhotoOption> {
        AVAILABLE_PHOTOS
            .iter()
            .map(|&photo| PhotoOption {
                photo,
                order: self.selected.iter().position(|p| p == photo).map(|i| i + 1),
            })
            .collect()
    }
}

/// Local form state, independent of the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub display_name: String,
    /// Typed text; parsed on submit.
    pub age: String,
    pub bio: String,
    pub gender: Gender,
    pub interested_in: Gender,
    pub location_text: String,
    pub photos: PhotoPicker,
}

impl ProfileForm {
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        match profile {
            Some(p) => Self {
                display_name: p.display_name.clone(),
                age: p.age.to_string(),
                bio: p.bio.clone(),
                gender: p.gender,
                interested_in: p.interested_in,
                location_text: p.location_text.clone(),
                photos: PhotoPicker::new(p.photos.clone()),
            },
            None => Self::default(),
        }
    }

    /// Build the profile to submit. The id is left anonymous; the backend
    /// assigns the caller identity.
    pub fn validate(&self) -> std::result::Result<Profile, ValidationError> {
        let mut errors = ValidationError::new();
        let age = parse_age(&self.age).map_err(|msg| errors.add(Field::Age, msg)).ok();
        let name = validate_display_name(&self.display_name)
            .map_err(|msg| errors.add(Field::DisplayName, msg))
            .ok();
        if let Err(msg) = validate_photo_count(self.photos.selected().len()) {
            errors.add(Field::Photos, msg);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        match (age, name) {
            (Some(age), Some(name)) => Ok(Profile {
                id: Principal::anonymous(),
                display_name: name.to_string(),
                age,
                bio: self.bio.trim().to_string(),
                gender: self.gender,
                interested_in: self.interested_in,
                location_text: self.location_text.trim().to_string(),
                photos: self.photos.selected().to_vec(),
            }),
            _ => Err(errors),
        }
    }
}

// Age first, then name, then photos: the order the form reports them.
fn first_message(errors: &ValidationError) -> &str {
    [Field::Age, Field::DisplayName, Field::Photos]
        .into_iter()
        .find_map(|field| errors.get(field))
        .unwrap_or("Please check the form")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    Loading,
    Editing {
        onboarding: bool,
        form: ProfileForm,
        saving: bool,
    },
}

pub struct ProfileView {
    app: App,
    onboarding: bool,
    form: Mutex<ProfileForm>,
    saving: Mutex<bool>,
    prefilled: Mutex<bool>,
}

impl ProfileView {
    pub fn new(app: App, onboarding: bool) -> Self {
        Self {
            app,
            onboarding,
            form: Mutex::new(ProfileForm::default()),
            saving: Mutex::new(false),
            prefilled: Mutex::new(false),
        }
    }

    /// Load the caller profile and prefill the form once.
    pub async fn enter(&self) -> Result<()> {
        let existing = self.app.queries.ensure(&CallerProfile).await?;
        let mut prefilled = self.prefilled.lock();
        if !*prefilled {
            *self.form.lock() = ProfileForm::from_profile((*existing).as_ref());
            *prefilled = true;
        }
        Ok(())
    }

    pub fn state(&self) -> ProfileState {
        if !*self.prefilled.lock() {
            return ProfileState::Loading;
        }
        ProfileState::Editing {
            onboarding: self.onboarding,
            form: self.form.lock().clone(),
            saving: *self.saving.lock(),
        }
    }

    pub fn edit(&self, f: impl FnOnce(&mut ProfileForm)) {
        f(&mut self.form.lock());
    }

    pub fn toggle_photo(&self, photo: &str) -> bool {
        self.form.lock().photos.toggle(photo)
    }

    /// Validate and save. Validation failures never reach the backend.
    /// Returns `None` when a save is already in flight.
    pub async fn submit(&self) -> Result<Option<Profile>> {
        let draft = self.form.lock().validate();
        let profile = match draft {
            Ok(profile) => profile,
            Err(errors) => {
                self.app.notifier.error(first_message(&errors), errors.to_string());
                return Err(ClientError::Validation(errors));
            }
        };

        {
            let mut saving = self.saving.lock();
            if *saving {
                return Ok(None);
            }
            *saving = true;
        }
        let outcome = self.app.queries.mutate(&SaveProfile { profile }).await;
        *self.saving.lock() = false;

        match outcome {
            Ok(saved) => {
                self.app.notifier.success(if self.onboarding {
                    "Profile created successfully!"
                } else {
                    "Profile updated successfully!"
                });
                if self.onboarding {
                    self.app.navigator.navigate(Route::Discover);
                }
                Ok(Some(saved))
            }
            Err(e) => {
                self.app
                    .notifier
                    .error("Failed to save profile. Please try again.", e.to_string());
                Err(e)
            }
        }
    }
}

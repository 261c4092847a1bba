//! Conversation service - the three-step creature creation wizard
//!
//! Drives one finite state machine per owner: material, then behavior, then
//! trait, each answer validated against its vocabulary. State is transient
//! and owned exclusively by this service in an explicit owner-keyed map;
//! nothing is persisted until the final step commits the creature in a
//! single store write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::ports::outbound::{CreatureRepositoryPort, StoreError};
use crate::domain::entities::{Creature, NewCreature};
use crate::domain::value_objects::{OwnerId, Vocabulary, VocabularySet};

/// Reply text that aborts an in-flight wizard from any step.
pub const CANCEL_SENTINEL: &str = "/cancel";

/// The attribute a wizard is currently asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Material,
    Behavior,
    Trait,
}

impl WizardStep {
    /// 1-based position for "STEP n/3" prompts.
    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Material => 1,
            Self::Behavior => 2,
            Self::Trait => 3,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Material => "material",
            Self::Behavior => "behavior",
            Self::Trait => "trait",
        };
        write!(f, "{name}")
    }
}

/// Transient per-owner wizard state. Each variant carries exactly the
/// attributes collected so far, so a half-built creature cannot be
/// committed by construction.
#[derive(Debug, Clone)]
enum WizardState {
    AwaitingMaterial {
        owner_name: String,
    },
    AwaitingBehavior {
        owner_name: String,
        material: String,
    },
    AwaitingTrait {
        owner_name: String,
        material: String,
        behavior: String,
    },
}

impl WizardState {
    fn step(&self) -> WizardStep {
        match self {
            Self::AwaitingMaterial { .. } => WizardStep::Material,
            Self::AwaitingBehavior { .. } => WizardStep::Behavior,
            Self::AwaitingTrait { .. } => WizardStep::Trait,
        }
    }
}

/// The options to present for one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPrompt {
    pub step: WizardStep,
    pub options: Vec<String>,
}

/// Result of feeding one valid reply into the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The reply was accepted; present the next step.
    Prompt(StepPrompt),
    /// The wizard was cancelled and its state dropped.
    Cancelled,
    /// The final reply was accepted and the creature committed.
    Completed(Creature),
}

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    /// The reply is not one of the options offered at the current step.
    /// Recoverable: the wizard state is unchanged.
    #[error("'{value}' is not one of the offered {step} options")]
    InvalidSelection { step: WizardStep, value: String },
    /// A wizard reply arrived for an owner with no wizard in flight.
    #[error("no active creature wizard for owner {0}")]
    NoActiveConversation(OwnerId),
    /// The final commit failed. The wizard state is preserved so the owner
    /// can resubmit the trait instead of restarting.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Conversation service trait defining the wizard use cases
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Start (or restart) a wizard for `owner`. Any in-flight wizard for
    /// the same owner is replaced: last writer wins, no merge.
    async fn begin(&self, owner: OwnerId, owner_name: String) -> StepPrompt;

    /// Feed one reply into the owner's wizard.
    async fn submit(&self, owner: OwnerId, text: &str)
        -> Result<SubmitOutcome, ConversationError>;

    /// Drop the owner's wizard, if any. Returns whether one existed.
    async fn cancel(&self, owner: OwnerId) -> bool;
}

/// Production conversation service backed by the creature repository.
pub struct ConversationServiceImpl {
    creatures: Arc<dyn CreatureRepositoryPort>,
    vocabularies: Arc<VocabularySet>,
    states: Mutex<HashMap<OwnerId, WizardState>>,
}

impl ConversationServiceImpl {
    pub fn new(creatures: Arc<dyn CreatureRepositoryPort>, vocabularies: Arc<VocabularySet>) -> Self {
        Self {
            creatures,
            vocabularies,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn vocabulary_for(&self, step: WizardStep) -> &Vocabulary {
        match step {
            WizardStep::Material => &self.vocabularies.materials,
            WizardStep::Behavior => &self.vocabularies.behaviors,
            WizardStep::Trait => &self.vocabularies.traits,
        }
    }

    fn prompt_for(&self, step: WizardStep) -> StepPrompt {
        StepPrompt {
            step,
            options: self.vocabulary_for(step).values().to_vec(),
        }
    }
}

#[async_trait]
impl ConversationService for ConversationServiceImpl {
    async fn begin(&self, owner: OwnerId, owner_name: String) -> StepPrompt {
        let mut states = self.states.lock().await;
        let previous = states.insert(owner, WizardState::AwaitingMaterial { owner_name });
        if previous.is_some() {
            debug!(%owner, "replaced in-flight wizard");
        }
        self.prompt_for(WizardStep::Material)
    }

    async fn submit(
        &self,
        owner: OwnerId,
        text: &str,
    ) -> Result<SubmitOutcome, ConversationError> {
        let value = text.trim();
        if value == CANCEL_SENTINEL {
            return if self.cancel(owner).await {
                debug!(%owner, "wizard cancelled");
                Ok(SubmitOutcome::Cancelled)
            } else {
                Err(ConversationError::NoActiveConversation(owner))
            };
        }

        let mut states = self.states.lock().await;
        let Some(state) = states.get(&owner) else {
            return Err(ConversationError::NoActiveConversation(owner));
        };

        let step = state.step();
        if !self.vocabulary_for(step).contains(value) {
            return Err(ConversationError::InvalidSelection {
                step,
                value: value.to_string(),
            });
        }

        let Some(state) = states.remove(&owner) else {
            return Err(ConversationError::NoActiveConversation(owner));
        };
        match state {
            WizardState::AwaitingMaterial { owner_name } => {
                states.insert(
                    owner,
                    WizardState::AwaitingBehavior {
                        owner_name,
                        material: value.to_string(),
                    },
                );
                Ok(SubmitOutcome::Prompt(self.prompt_for(WizardStep::Behavior)))
            }
            WizardState::AwaitingBehavior {
                owner_name,
                material,
            } => {
                states.insert(
                    owner,
                    WizardState::AwaitingTrait {
                        owner_name,
                        material,
                        behavior: value.to_string(),
                    },
                );
                Ok(SubmitOutcome::Prompt(self.prompt_for(WizardStep::Trait)))
            }
            WizardState::AwaitingTrait {
                owner_name,
                material,
                behavior,
            } => {
                // The entry is already out of the map; commit outside the
                // lock so other owners' wizards are not held up by the write.
                drop(states);

                let new = NewCreature {
                    owner_id: owner,
                    owner_name: owner_name.clone(),
                    material: material.clone(),
                    behavior: behavior.clone(),
                    trait_: value.to_string(),
                };
                match self.creatures.insert_creature(new).await {
                    Ok(creature) => {
                        info!(%owner, creature_id = %creature.id, "creature committed");
                        Ok(SubmitOutcome::Completed(creature))
                    }
                    Err(err) => {
                        // Keep the collected attributes so the owner can
                        // resubmit the trait, unless a newer wizard was
                        // begun meanwhile (last writer wins).
                        let mut states = self.states.lock().await;
                        states.entry(owner).or_insert(WizardState::AwaitingTrait {
                            owner_name,
                            material,
                            behavior,
                        });
                        Err(err.into())
                    }
                }
            }
        }
    }

    async fn cancel(&self, owner: OwnerId) -> bool {
        self.states.lock().await.remove(&owner).is_some()
    }
}

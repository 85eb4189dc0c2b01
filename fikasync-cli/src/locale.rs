//! User-facing strings in English, Russian and Ukrainian.
//!
//! Log lines stay in English; only what ends up on stdout or in a prompt
//! goes through [`Messages`]. Templates use positional `{0}`, `{1}`
//! placeholders filled by [`Messages::fill`].

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Ru,
    Uk,
}

impl Lang {
    /// Language of the user's locale (`LC_ALL`, `LC_MESSAGES`, `LANG`),
    /// English when unset or unsupported.
    pub fn from_system() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .and_then(|value| {
                let code: String = value.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
                code.parse().ok()
            })
            .unwrap_or_default()
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ru" | "be" => Ok(Self::Ru),
            "uk" | "ua" => Ok(Self::Uk),
            other => Err(format!("unknown language '{other}'; expected: en, ru, uk")),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::Uk => "uk",
        })
    }
}

/// Message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    // General
    SetupIncomplete,
    RepoTarget,
    AuthSuccess,
    OfflineMode,
    StartGameNoSync,
    LaunchCanceled,
    SyncFailed,

    // Init
    TokenPrompt,
    TokenUnusual,
    TokenUnusualLoaded,
    UrlPrompt,
    UrlInvalid,
    ConfigSaved,

    // Update notice
    UpdateAvailable,
    UpdateBody,
    UpdateLatest,

    // Startup report
    SyncNoProfiles,
    SyncFound,
    SyncUpdatedCount,
    SyncPending,
    TableFile,
    TableStatus,
    TableAction,
    StatusSynced,
    StatusLocalNewer,
    StatusNewLocal,
    StatusUpdate,
    ActionPass,
    ActionWillUpload,
    ActionDownloaded,

    // Shutdown report
    SyncTitle,
    SyncProfileTitle,
    SyncReasonTitle,
    SyncResultTitle,
    SyncNoLocal,
    ReasonNewProgress,
    ReasonPending,
    ResultConflict,
    ResultRemoteNewer,
    ResultSent,
    ResultError,
    SyncAllDone,
    SyncUploadedCount,

    // Game session
    GameStarting,
    ServerTimeout,
    ServerSuccess,
    LauncherNotFound,
    GameCloseInstruction,
    ServerExited,

    // Status and backups
    TableMarker,
    TableHash,
    TableTakenAt,
    TablePath,
    NoBackups,
}

/// String lookup for one language.
#[derive(Debug, Clone, Copy, Default)]
pub struct Messages {
    lang: Lang,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn text(&self, msg: Msg) -> &'static str {
        match self.lang {
            Lang::En => en(msg),
            Lang::Ru => ru(msg),
            Lang::Uk => uk(msg),
        }
    }

    /// `text(msg)` with `{0}`, `{1}`, ... replaced by `args`.
    pub fn fill(&self, msg: Msg, args: &[&dyn fmt::Display]) -> String {
        args.iter()
            .enumerate()
            .fold(self.text(msg).to_string(), |acc, (i, arg)| {
                acc.replace(&format!("{{{i}}}"), &arg.to_string())
            })
    }
}

fn en(msg: Msg) -> &'static str {
    match msg {
        Msg::SetupIncomplete => "Setup not complete. Run `fikasync init` first.",
        Msg::RepoTarget => "Target repository: {0}",
        Msg::AuthSuccess => "Authorized as: {0}",
        Msg::OfflineMode => "Offline mode (GitHub not reachable).",
        Msg::StartGameNoSync => "Start the game without synchronization?",
        Msg::LaunchCanceled => "Launch canceled.",
        Msg::SyncFailed => "Synchronization error: {0}",

        Msg::TokenPrompt => "Enter your GitHub PAT:",
        Msg::TokenUnusual => "The token does not look like a GitHub PAT; saving it anyway.",
        Msg::TokenUnusualLoaded => "GITHUB_PAT does not look like a GitHub token; trying it anyway.",
        Msg::UrlPrompt => "Enter the HTTPS URL of the repository:",
        Msg::UrlInvalid => "The link must look like https://github.com/<owner>/<repo>",
        Msg::ConfigSaved => "Settings are saved in {0}",

        Msg::UpdateAvailable => "UPDATE AVAILABLE",
        Msg::UpdateBody => "New version available: v{0}\nYour version: v{1}\n\nDownload the release from {2} and replace the installed files by hand.",
        Msg::UpdateLatest => "The program version is up to date. (v{0})",

        Msg::SyncNoProfiles => "No profiles found in the cloud (repository is empty).",
        Msg::SyncFound => "Profiles in cloud: {0}",
        Msg::SyncUpdatedCount => "Updated {0} profiles from cloud.",
        Msg::SyncPending => "Waiting for upload after the session: {0}",
        Msg::TableFile => "File",
        Msg::TableStatus => "Status",
        Msg::TableAction => "Action",
        Msg::StatusSynced => "Synced",
        Msg::StatusLocalNewer => "Local Newer",
        Msg::StatusNewLocal => "New Local",
        Msg::StatusUpdate => "Update",
        Msg::ActionPass => "-",
        Msg::ActionWillUpload => "Will Upload Later",
        Msg::ActionDownloaded => "Downloaded",

        Msg::SyncTitle => "Synchronization",
        Msg::SyncProfileTitle => "Profile",
        Msg::SyncReasonTitle => "Reason",
        Msg::SyncResultTitle => "Result",
        Msg::SyncNoLocal => "No local profiles found.",
        Msg::ReasonNewProgress => "New Progress",
        Msg::ReasonPending => "Pending Sync",
        Msg::ResultConflict => "Conflict",
        Msg::ResultRemoteNewer => "Remote is newer now",
        Msg::ResultSent => "Sent",
        Msg::ResultError => "Error: {0}",
        Msg::SyncAllDone => "Everything is synchronized.",
        Msg::SyncUploadedCount => "Uploaded {0} profiles.",

        Msg::GameStarting => "Starting the game",
        Msg::ServerTimeout => "Server wait timeout.",
        Msg::ServerSuccess => "The server has successfully booted up {0}",
        Msg::LauncherNotFound => "Launcher not found!",
        Msg::GameCloseInstruction => {
            "Press ENTER in this window to close the server and synchronize the profile."
        }
        Msg::ServerExited => "The server shut down unexpectedly!",

        Msg::TableMarker => "Marker",
        Msg::TableHash => "Hash",
        Msg::TableTakenAt => "Taken at",
        Msg::TablePath => "Path",
        Msg::NoBackups => "No backups found.",
    }
}

fn ru(msg: Msg) -> &'static str {
    match msg {
        Msg::SetupIncomplete => "Настройка не завершена. Сначала выполните `fikasync init`.",
        Msg::RepoTarget => "Целевой репозиторий: {0}",
        Msg::AuthSuccess => "Авторизован как: {0}",
        Msg::OfflineMode => "Офлайн режим (нет доступа к GitHub).",
        Msg::StartGameNoSync => "Запустить игру без синхронизации?",
        Msg::LaunchCanceled => "Запуск отменен.",
        Msg::SyncFailed => "Ошибка синхронизации: {0}",

        Msg::TokenPrompt => "Введите ваш GitHub PAT:",
        Msg::TokenUnusual => "Токен не похож на GitHub PAT, но он будет сохранен.",
        Msg::TokenUnusualLoaded => "GITHUB_PAT не похож на токен GitHub, пробуем все равно.",
        Msg::UrlPrompt => "Введите HTTPS URL репозитория:",
        Msg::UrlInvalid => "Ссылка должна иметь вид https://github.com/<owner>/<repo>",
        Msg::ConfigSaved => "Настройки сохранены в {0}",

        Msg::UpdateAvailable => "ДОСТУПНО ОБНОВЛЕНИЕ",
        Msg::UpdateBody => "Новая версия: v{0}\nВаша версия: v{1}\n\nСкачайте релиз по ссылке {2} и замените установленные файлы вручную.",
        Msg::UpdateLatest => "У вас последняя версия программы. (v{0})",

        Msg::SyncNoProfiles => "В облаке нет профилей (репозиторий пуст).",
        Msg::SyncFound => "Профилей в облаке: {0}",
        Msg::SyncUpdatedCount => "Обновлено {0} профилей из облака.",
        Msg::SyncPending => "Будут отправлены после сессии: {0}",
        Msg::TableFile => "Файл",
        Msg::TableStatus => "Статус",
        Msg::TableAction => "Действие",
        Msg::StatusSynced => "Актуал",
        Msg::StatusLocalNewer => "Локальный новее",
        Msg::StatusNewLocal => "Новый локальный",
        Msg::StatusUpdate => "Обновить",
        Msg::ActionPass => "-",
        Msg::ActionWillUpload => "Будет отправлен",
        Msg::ActionDownloaded => "Загружен",

        Msg::SyncTitle => "Синхронизация",
        Msg::SyncProfileTitle => "Профиль",
        Msg::SyncReasonTitle => "Причина",
        Msg::SyncResultTitle => "Результат",
        Msg::SyncNoLocal => "Локальные профили не найдены.",
        Msg::ReasonNewProgress => "Новый прогресс",
        Msg::ReasonPending => "Отложенная синхра",
        Msg::ResultConflict => "Конфликт",
        Msg::ResultRemoteNewer => "В облаке новее",
        Msg::ResultSent => "Отправлен",
        Msg::ResultError => "Ошибка: {0}",
        Msg::SyncAllDone => "Всё синхронизировано.",
        Msg::SyncUploadedCount => "Отправлено профилей: {0}.",

        Msg::GameStarting => "Запуск игры",
        Msg::ServerTimeout => "Время ожидания сервера истекло.",
        Msg::ServerSuccess => "Сервер успешно запущен {0}",
        Msg::LauncherNotFound => "Лаунчер не найден!",
        Msg::GameCloseInstruction => {
            "Нажмите ENTER в этом окне, чтобы закрыть сервер и синхронизировать профиль."
        }
        Msg::ServerExited => "Сервер неожиданно завершил работу!",

        Msg::TableMarker => "Метка",
        Msg::TableHash => "Хеш",
        Msg::TableTakenAt => "Создан",
        Msg::TablePath => "Путь",
        Msg::NoBackups => "Резервные копии не найдены.",
    }
}

fn uk(msg: Msg) -> &'static str {
    match msg {
        Msg::SetupIncomplete => "Налаштування не завершено. Спочатку виконайте `fikasync init`.",
        Msg::RepoTarget => "Цільовий репозиторій: {0}",
        Msg::AuthSuccess => "Авторизовано як: {0}",
        Msg::OfflineMode => "Офлайн режим (немає доступу до GitHub).",
        Msg::StartGameNoSync => "Запустити гру без синхронізації?",
        Msg::LaunchCanceled => "Запуск скасовано.",
        Msg::SyncFailed => "Помилка синхронізації: {0}",

        Msg::TokenPrompt => "Введіть ваш GitHub PAT:",
        Msg::TokenUnusual => "Токен не схожий на GitHub PAT, але його буде збережено.",
        Msg::TokenUnusualLoaded => "GITHUB_PAT не схожий на токен GitHub, пробуємо все одно.",
        Msg::UrlPrompt => "Введіть HTTPS URL репозиторію:",
        Msg::UrlInvalid => "Посилання має виглядати як https://github.com/<owner>/<repo>",
        Msg::ConfigSaved => "Налаштування збережено в {0}",

        Msg::UpdateAvailable => "ДОСТУПНЕ ОНОВЛЕННЯ",
        Msg::UpdateBody => "Нова версія: v{0}\nВаша версія: v{1}\n\nЗавантажте реліз за посиланням {2} і замініть встановлені файли вручну.",
        Msg::UpdateLatest => "У вас остання версія програми. (v{0})",

        Msg::SyncNoProfiles => "У хмарі немає профілів (репозиторій порожній).",
        Msg::SyncFound => "Профілів у хмарі: {0}",
        Msg::SyncUpdatedCount => "Оновлено {0} профілів з хмари.",
        Msg::SyncPending => "Буде надіслано після сесії: {0}",
        Msg::TableFile => "Файл",
        Msg::TableStatus => "Статус",
        Msg::TableAction => "Дія",
        Msg::StatusSynced => "Актуал",
        Msg::StatusLocalNewer => "Локальний новіший",
        Msg::StatusNewLocal => "Новий локальний",
        Msg::StatusUpdate => "Оновити",
        Msg::ActionPass => "-",
        Msg::ActionWillUpload => "Буде надіслано",
        Msg::ActionDownloaded => "Завантажено",

        Msg::SyncTitle => "Синхронізація",
        Msg::SyncProfileTitle => "Профіль",
        Msg::SyncReasonTitle => "Причина",
        Msg::SyncResultTitle => "Результат",
        Msg::SyncNoLocal => "Локальні профілі не знайдені.",
        Msg::ReasonNewProgress => "Новий прогрес",
        Msg::ReasonPending => "Відкладена синхр",
        Msg::ResultConflict => "Конфлікт",
        Msg::ResultRemoteNewer => "У хмарі новіше",
        Msg::ResultSent => "Надіслано",
        Msg::ResultError => "Помилка: {0}",
        Msg::SyncAllDone => "Все синхронізовано.",
        Msg::SyncUploadedCount => "Надіслано профілів: {0}.",

        Msg::GameStarting => "Запуск гри",
        Msg::ServerTimeout => "Час очікування сервера вичерпано.",
        Msg::ServerSuccess => "Сервер успішно запущено {0}",
        Msg::LauncherNotFound => "Лаунчер не знайдено!",
        Msg::GameCloseInstruction => {
            "Натисніть ENTER у цьому вікні, щоб закрити сервер та синхронізувати профіль."
        }
        Msg::ServerExited => "Сервер несподівано завершив роботу!",

        Msg::TableMarker => "Мітка",
        Msg::TableHash => "Хеш",
        Msg::TableTakenAt => "Створено",
        Msg::TablePath => "Шлях",
        Msg::NoBackups => "Резервні копії не знайдені.",
    }
}

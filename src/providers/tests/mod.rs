mod http_providers;
